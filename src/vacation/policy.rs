/// Tunable rules applied when a request is created or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VacationPolicy {
    /// Minimum number of calendar days between today and the first day off.
    pub min_notice_days: i64,
    /// Minimum number of business days a request must cover.
    pub min_business_days: i32,
    /// Run the full create-time checks again when a pending request is edited.
    pub revalidate_on_update: bool,
}

impl Default for VacationPolicy {
    fn default() -> Self {
        Self {
            min_notice_days: 15,
            min_business_days: 5,
            revalidate_on_update: false,
        }
    }
}
