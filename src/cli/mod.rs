pub mod args;
pub mod validation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Plan,
    Products,
    Classification,
    Dashboard,
}

impl View {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "plan" | "planner" => Some(Self::Plan),
            "products" | "top" => Some(Self::Products),
            "classification" | "abcde" => Some(Self::Classification),
            "dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Plan => "plan",
            View::Products => "products",
            View::Classification => "classification",
            View::Dashboard => "dashboard",
        }
    }
}
