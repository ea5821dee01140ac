use super::{round_to, Dataset};
use crate::dates::CalendarDate;
use crate::records::{
    Alert, ClassLetter, ClassificationRow, DailySupport, PlanItem, PlanStatus, ProductRow,
    Severity,
};

const CATEGORIES: [&str; 8] = [
    "Adhesives",
    "Brushes",
    "Paints",
    "Sealants",
    "Rollers",
    "Tapes",
    "Solvents",
    "Sandpaper",
];

const OWNERS: [&str; 8] = [
    "Ana Ruiz",
    "Luis Soto",
    "Carla Mena",
    "Mario Silva",
    "Julia Ponce",
    "Pedro Flores",
    "Marco Leon",
    "Rosa Vega",
];

const CLASS_CYCLE: [ClassLetter; 8] = [
    ClassLetter::A,
    ClassLetter::A,
    ClassLetter::B,
    ClassLetter::B,
    ClassLetter::C,
    ClassLetter::C,
    ClassLetter::D,
    ClassLetter::E,
];

const PRODUCT_COUNT: usize = 72;
const PLAN_COUNT: usize = 68;
const PLAN_SPREAD: u64 = 35;
const PLAN_LOOKBACK: u64 = 20;
const SERIES_DAYS: u64 = 30;

impl Dataset {
    /// Deterministic demo data anchored at `today`.
    pub fn sample(today: CalendarDate) -> Self {
        let products = sample_products();
        let classification = products
            .iter()
            .zip(CLASS_CYCLE.iter().cycle())
            .map(|(p, class)| ClassificationRow {
                id: p.id.clone(),
                item_code: p.item.clone(),
                class: *class,
            })
            .collect();
        let plan = sample_plan(&products, today);
        Self {
            products,
            classification,
            alerts: sample_alerts(),
            plan,
            daily_support: sample_series(today),
            coverage: 92.3,
        }
    }
}

fn sample_products() -> Vec<ProductRow> {
    (0..PRODUCT_COUNT)
        .map(|i| {
            let index = i + 1;
            let category = CATEGORIES[i % CATEGORIES.len()];
            let support = 1800i64 - i as i64 * 17;
            ProductRow {
                id: index.to_string(),
                item: format!("ITM-{}", 1000 + index),
                absolute_support: support.max(120) as u32,
                relative_support: round_to(22.5 - i as f64 * 0.22, 2).max(0.5),
                description: format!("{category} Product {index}"),
                category: category.to_string(),
            }
        })
        .collect()
}

fn sample_plan(products: &[ProductRow], today: CalendarDate) -> Vec<PlanItem> {
    products
        .iter()
        .cycle()
        .take(PLAN_COUNT)
        .enumerate()
        .map(|(i, product)| {
            let shift = i as u64 % PLAN_SPREAD;
            let date = if shift <= PLAN_LOOKBACK {
                today.days_before(PLAN_LOOKBACK - shift)
            } else {
                today.days_after(shift - PLAN_LOOKBACK)
            };
            PlanItem {
                id: format!("p{}", i + 1),
                date,
                item: product.item.clone(),
                product: product.description.clone(),
                status: PlanStatus::CYCLE[i % PlanStatus::CYCLE.len()],
                owner: OWNERS[i % OWNERS.len()].to_string(),
                notes: format!("Batch review {}", i + 1),
                category: product.category.clone(),
            }
        })
        .collect()
}

fn sample_series(today: CalendarDate) -> Vec<DailySupport> {
    (0..SERIES_DAYS)
        .map(|i| {
            let bump = if i % 4 == 0 { 40 } else { -15 };
            DailySupport {
                date: today.days_before(SERIES_DAYS - 1 - i),
                support: 580 + i as i64 * 24 + bump,
            }
        })
        .collect()
}

fn sample_alerts() -> Vec<Alert> {
    vec![
        Alert {
            id: "a1".to_string(),
            severity: Severity::High,
            message: "ITM-1001 exceeds the projected demand threshold.".to_string(),
        },
        Alert {
            id: "a2".to_string(),
            severity: Severity::Medium,
            message: "Supplier delay for category Brushes.".to_string(),
        },
        Alert {
            id: "a3".to_string(),
            severity: Severity::Low,
            message: "Minimum stock recommended for Sealants.".to_string(),
        },
    ]
}
