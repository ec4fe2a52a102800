use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::{Warning, WarningKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningSummary {
    pub total: usize,
    pub by_kind: BTreeMap<WarningKind, usize>,
}

impl WarningSummary {
    pub fn from_warnings(warnings: &[Warning]) -> Self {
        let mut by_kind = BTreeMap::new();
        for w in warnings {
            *by_kind.entry(w.kind).or_insert(0) += 1;
        }
        Self {
            total: warnings.len(),
            by_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn warning(kind: WarningKind) -> Warning {
        Warning {
            id: Uuid::new_v4(),
            interview_id: Uuid::nil(),
            kind,
            message: None,
            occurred_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn counts_per_kind() {
        let ws = vec![
            warning(WarningKind::TabSwitch),
            warning(WarningKind::MultipleFaces),
            warning(WarningKind::TabSwitch),
        ];
        let summary = WarningSummary::from_warnings(&ws);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_kind[&WarningKind::TabSwitch], 2);
        assert_eq!(summary.by_kind[&WarningKind::MultipleFaces], 1);
        assert!(!summary.by_kind.contains_key(&WarningKind::LookingAway));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["by_kind"]["tab_switch"], 2);
    }

    #[test]
    fn empty_summary() {
        assert_eq!(WarningSummary::from_warnings(&[]), WarningSummary::default());
    }
}
