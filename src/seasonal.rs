//! Static seasonal calendar.
//!
//! Demand swings over the year differ by customer segment (students vanish
//! over the summer break, office workers over the Tet holiday) and by
//! business type (ice cream in July, flower shops in February). The tables
//! here feed the component scorer's seasonal multiplier and a couple of
//! rule/recommendation paths.

use crate::context::CustomerSegment;

/// Demand multiplier for a customer segment in a given month (1-12).
///
/// Out-of-range months return the neutral 1.0 rather than failing; the
/// caller may be holding an unvalidated month from user input.
pub fn segment_multiplier(segment: CustomerSegment, month: u32) -> f64 {
    if !(1..=12).contains(&month) {
        return 1.0;
    }
    let idx = (month - 1) as usize;
    segment_pattern(segment)[idx]
}

/// Twelve-month demand pattern for a segment, January first.
pub fn segment_pattern(segment: CustomerSegment) -> [f64; 12] {
    match segment {
        CustomerSegment::General => {
            [0.9, 0.8, 1.1, 1.2, 1.0, 0.9, 0.9, 0.9, 1.1, 1.2, 1.3, 1.4]
        }
        CustomerSegment::Student => {
            [0.7, 0.6, 1.2, 1.3, 1.4, 0.8, 0.7, 0.7, 1.5, 1.3, 1.2, 1.0]
        }
        CustomerSegment::Office => {
            [0.9, 0.7, 1.3, 1.2, 1.1, 1.0, 1.1, 1.0, 1.2, 1.3, 1.2, 1.4]
        }
        CustomerSegment::Family => {
            [0.9, 0.8, 1.1, 1.2, 1.1, 1.0, 1.3, 1.2, 1.4, 1.2, 1.1, 1.5]
        }
        CustomerSegment::Tourist => {
            [0.8, 0.7, 1.1, 1.4, 1.2, 0.9, 1.0, 1.0, 1.1, 1.3, 1.4, 1.5]
        }
        CustomerSegment::Elderly => {
            [0.9, 0.8, 1.1, 1.3, 1.2, 0.9, 0.8, 0.8, 1.1, 1.3, 1.4, 1.2]
        }
        CustomerSegment::YoungProfessional => {
            [0.9, 0.7, 1.2, 1.3, 1.2, 1.0, 1.1, 1.0, 1.3, 1.2, 1.1, 1.4]
        }
    }
}

/// Twelve-month demand pattern for a business type, January first.
/// Unlisted types get a flat 1.0 pattern.
pub fn business_pattern(business_id: &str) -> [f64; 12] {
    match business_id {
        "ice_cream" => [0.3, 0.4, 0.7, 1.1, 1.3, 1.2, 1.5, 1.4, 1.1, 0.9, 0.6, 0.5],
        "milk_tea" => [0.8, 0.6, 1.2, 1.3, 1.4, 1.1, 1.0, 0.9, 1.5, 1.3, 1.2, 1.1],
        "spa" => [1.1, 0.8, 1.2, 1.3, 1.2, 1.0, 0.9, 0.9, 1.1, 1.3, 1.4, 1.5],
        "pharmacy" => [1.2, 0.9, 1.1, 1.0, 1.1, 1.3, 1.2, 1.1, 1.0, 1.1, 1.2, 1.3],
        "flower_shop" => [0.8, 1.5, 1.4, 1.2, 1.1, 0.9, 0.8, 0.9, 1.0, 1.3, 1.2, 1.4],
        "clothing" => [0.9, 0.8, 1.1, 1.3, 1.2, 1.0, 1.1, 1.0, 1.4, 1.3, 1.2, 1.5],
        "bookstore" => [0.9, 0.7, 1.2, 1.1, 1.0, 0.8, 0.7, 0.8, 1.5, 1.2, 1.1, 1.0],
        "toy_store" => [0.8, 0.9, 1.0, 1.1, 1.2, 1.4, 1.3, 1.2, 1.1, 1.0, 1.2, 1.8],
        "cafe" => [0.9, 0.7, 1.1, 1.2, 1.1, 1.0, 1.0, 1.0, 1.2, 1.3, 1.2, 1.1],
        "gaming" => [1.1, 0.8, 1.0, 1.0, 1.1, 1.2, 1.4, 1.3, 0.9, 1.0, 1.1, 1.2],
        _ => [1.0; 12],
    }
}

/// Peak-to-trough spread of a business's seasonal pattern.
/// Flat-pattern (unlisted) types report 0.
pub fn seasonal_amplitude(business_id: &str) -> f64 {
    let pattern = business_pattern(business_id);
    let max = pattern.iter().copied().fold(f64::MIN, f64::max);
    let min = pattern.iter().copied().fold(f64::MAX, f64::min);
    max - min
}

/// Month (1-12) in which a business's seasonal demand peaks.
pub fn peak_month(business_id: &str) -> u32 {
    let pattern = business_pattern(business_id);
    let mut best = 0;
    for (i, v) in pattern.iter().enumerate() {
        if *v > pattern[best] {
            best = i;
        }
    }
    best as u32 + 1
}
