use crate::models::form::Budget;

// Base daily cost per person (KRW): lodging + meals + local transit +
// admissions + misc. Domestic-travel figures.
const DAILY_LODGING: i64 = 50_000;
const DAILY_MEALS: i64 = 30_000;
const DAILY_TRANSIT: i64 = 15_000;
const DAILY_SIGHTSEEING: i64 = 20_000;
const DAILY_MISC: i64 = 10_000;

/// Regional price adjustment, Seoul-area baseline 1.0. Matched by substring
/// against the destination.
const REGION_MULTIPLIERS: &[(&str, f64)] = &[
    ("서울", 1.2),
    ("인천", 1.0),
    ("경기", 1.0),
    ("제주", 1.4),
    ("부산", 1.1),
    ("대구", 0.9),
    ("광주", 0.9),
    ("대전", 0.9),
    ("울산", 0.9),
    ("강원", 1.1),
    ("춘천", 1.1),
    ("강릉", 1.2),
    ("속초", 1.2),
    ("평창", 1.1),
    ("경주", 1.0),
    ("안동", 0.8),
    ("포항", 0.9),
    ("창원", 0.9),
    ("진주", 0.8),
    ("전주", 0.9),
    ("여수", 1.1),
    ("순천", 0.8),
    ("목포", 0.8),
    ("충주", 0.8),
    ("천안", 0.9),
    ("청주", 0.8),
    ("공주", 0.8),
    ("통영", 1.0),
    ("거제", 1.0),
];

pub struct CostService;

impl CostService {
    /// Estimated per-person cost for the whole trip, adjusted by budget
    /// tier, region, and a small long-trip discount.
    pub fn estimate_per_person(budget: Budget, travel_days: i64, destination: &str) -> i64 {
        let base_daily =
            DAILY_LODGING + DAILY_MEALS + DAILY_TRANSIT + DAILY_SIGHTSEEING + DAILY_MISC;

        let budget_adjusted = base_daily as f64 * budget.cost_multiplier();

        let region_multiplier = REGION_MULTIPLIERS
            .iter()
            .find(|(region, _)| destination.contains(region))
            .map(|(_, m)| *m)
            .unwrap_or(1.0);

        let day_discount = if travel_days >= 7 {
            0.9
        } else if travel_days >= 4 {
            0.95
        } else {
            1.0
        };

        (budget_adjusted * region_multiplier * travel_days as f64 * day_discount) as i64
    }

    /// Display string the plan document carries, e.g. "1인당 275,000원".
    pub fn format_per_person(cost: i64) -> String {
        format!("1인당 {}원", group_thousands(cost))
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
