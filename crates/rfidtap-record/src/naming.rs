use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// `<base>_<YYYY-MM-DD>`
#[must_use]
pub fn daily_base_name(base_name: &str, date: NaiveDate) -> String {
    format!("{base_name}_{}", date.format("%Y-%m-%d"))
}

#[must_use]
pub fn log_file_name(base: &str, suffix: u32) -> String {
    format!("{base}_{suffix}.csv")
}

/// First `<dir>/<base>_<n>.csv` that does not exist yet, probing from `n = 1`.
#[must_use]
pub fn next_available_path(dir: &Path, base: &str) -> PathBuf {
    let mut suffix = 1_u32;
    loop {
        let candidate = dir.join(log_file_name(base, suffix));
        if !candidate.exists() {
            return candidate;
        }
        suffix = suffix.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{daily_base_name, log_file_name};

    #[test]
    fn base_name_embeds_iso_date() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 5).expect("valid date");
        assert_eq!(
            daily_base_name("client_data_log", date),
            "client_data_log_2023-05-05"
        );
    }

    #[test]
    fn file_name_appends_suffix_and_extension() {
        assert_eq!(
            log_file_name("client_data_log_2023-05-05", 3),
            "client_data_log_2023-05-05_3.csv"
        );
    }
}
