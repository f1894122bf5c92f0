//! Temporal resolver: validates a filter, then expands it into URL
//! candidates via the master file list (§4.4).

use crate::error::GdeltError;
use crate::filter::{DateRange, Filter};
use crate::masterlist::MasterFileList;
use crate::transport::Transport;

pub async fn resolve_urls<F: Filter>(
    master_list: &MasterFileList,
    transport: &Transport,
    filter: &F,
    include_translated: bool,
) -> Result<Vec<String>, GdeltError> {
    filter.validate()?;
    let range: DateRange = filter.date_range()?;
    master_list
        .resolve(transport, filter.dataset(), &range, include_translated)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::GkgFilter;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn invalid_filter_is_rejected_before_any_network_call() {
        let master_list = MasterFileList::new(std::time::Duration::from_secs(300));
        let transport =
            Transport::new(crate::transport::Timeouts::uniform(std::time::Duration::from_secs(5)), 1)
                .unwrap();
        let filter = GkgFilter {
            date_range: Some(crate::filter::DateRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end: Some(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()),
            }),
            ..Default::default()
        };
        let result = resolve_urls(&master_list, &transport, &filter, false).await;
        assert!(matches!(result, Err(GdeltError::Validation(_))));
    }
}
