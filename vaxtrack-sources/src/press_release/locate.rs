use chrono::NaiveDate;

/// URL of the press-release index published for `date`.
///
/// ```
/// use chrono::NaiveDate;
/// use vaxtrack_sources::press_release::index_url;
///
/// let date = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
/// assert_eq!(
///     index_url("https://www.info.gov.hk", date),
///     "https://www.info.gov.hk/gia/general/202103/05.htm"
/// );
/// ```
pub fn index_url(origin: &str, date: NaiveDate) -> String {
    format!(
        "{origin}/gia/general/{}/{}.htm",
        date.format("%Y%m"),
        date.format("%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_month_date() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        let url = index_url("https://www.info.gov.hk", date);
        assert!(url.ends_with("/202103/15.htm"), "{url}");
    }

    #[test]
    fn pads_single_digit_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
        assert_eq!(
            index_url("http://127.0.0.1:8080", date),
            "http://127.0.0.1:8080/gia/general/202201/02.htm"
        );
    }
}
