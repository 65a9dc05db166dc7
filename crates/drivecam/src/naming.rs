use chrono::{NaiveDateTime, Timelike};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `image_<YYYYMMDD_HHMMSS>.jpg`, with `_<n>` appended for the n-th repeat
/// of the same second.
pub fn frame_name(at: NaiveDateTime, repeat: u32) -> String {
    let stamp = at.format(TIMESTAMP_FORMAT);
    if repeat == 0 {
        format!("image_{}.jpg", stamp)
    } else {
        format!("image_{}_{}.jpg", stamp, repeat)
    }
}

/// Hands out timestamp names, never the same one twice in a row.
#[derive(Debug, Default)]
pub struct FrameNamer {
    last: Option<NaiveDateTime>,
    repeats: u32,
}

impl FrameNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self, at: NaiveDateTime) -> String {
        let second = at.with_nanosecond(0).unwrap_or(at);

        if self.last == Some(second) {
            self.repeats += 1;
        } else {
            self.last = Some(second);
            self.repeats = 0;
        }

        frame_name(second, self.repeats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_milli_opt(h, m, s, milli)
            .unwrap()
    }

    #[test]
    fn formats_timestamp() {
        assert_eq!(frame_name(at(7, 5, 3, 0), 0), "image_20240309_070503.jpg");
    }

    #[test]
    fn distinct_seconds_get_plain_names() {
        let mut namer = FrameNamer::new();
        assert_eq!(namer.next_name(at(12, 0, 0, 0)), "image_20240309_120000.jpg");
        assert_eq!(namer.next_name(at(12, 0, 6, 0)), "image_20240309_120006.jpg");
    }

    #[test]
    fn same_second_gets_suffix() {
        let mut namer = FrameNamer::new();
        let names: Vec<String> = [0, 300, 600, 900]
            .iter()
            .map(|&ms| namer.next_name(at(12, 0, 0, ms)))
            .collect();

        assert_eq!(
            names,
            vec![
                "image_20240309_120000.jpg",
                "image_20240309_120000_1.jpg",
                "image_20240309_120000_2.jpg",
                "image_20240309_120000_3.jpg",
            ]
        );
    }

    #[test]
    fn counter_resets_on_new_second() {
        let mut namer = FrameNamer::new();
        namer.next_name(at(12, 0, 0, 0));
        namer.next_name(at(12, 0, 0, 500));
        assert_eq!(namer.next_name(at(12, 0, 1, 0)), "image_20240309_120001.jpg");
    }
}
