use super::*;

#[test]
fn three_oclock_angles() {
    let face = ClockFace::at(ClockTime::new(3, 0, 0).unwrap());
    assert_eq!(face.minute_angle_deg, 90.0);
    // the hour hand uses the hour as-is: 03:00 points due east
    assert_eq!(face.hour_angle_deg, 0.0);
}

#[test]
fn hands_advance_with_minutes_and_seconds() {
    let face = ClockFace::at(ClockTime::new(0, 30, 30).unwrap());
    assert_eq!(face.minute_angle_deg, 90.0 - (180.0 + 3.0));
    assert_eq!(face.hour_angle_deg, 90.0 - (15.0 + 0.25));

    let noon = ClockFace::at(ClockTime::new(12, 0, 0).unwrap());
    let midnight = ClockFace::at(ClockTime::new(0, 0, 0).unwrap());
    assert_eq!(
        (noon.hour_angle_deg - midnight.hour_angle_deg).rem_euclid(360.0),
        0.0
    );
}

#[test]
fn dial_has_twelve_ticks_with_four_majors() {
    let face = ClockFace::at(ClockTime::new(9, 41, 0).unwrap());
    assert_eq!(face.ticks.len(), 12);
    let majors: Vec<_> = face
        .ticks
        .iter()
        .filter(|t| t.major)
        .map(|t| t.angle_deg)
        .collect();
    assert_eq!(majors, vec![0.0, 90.0, 180.0, 270.0]);
    assert_eq!(face.ticks[11].angle_deg, 330.0);
}

#[test]
fn out_of_range_times_are_rejected() {
    assert!(ClockTime::new(24, 0, 0).is_err());
    assert!(ClockTime::new(0, 60, 0).is_err());
    assert!(ClockTime::new(0, 0, 60).is_err());
    assert!(ClockTime::new(23, 59, 59).is_ok());
}

#[test]
fn parse_accepts_with_and_without_seconds() {
    assert_eq!(
        ClockTime::parse("07:05").unwrap(),
        ClockTime::new(7, 5, 0).unwrap()
    );
    assert_eq!(
        ClockTime::parse("23:59:58").unwrap(),
        ClockTime::new(23, 59, 58).unwrap()
    );
    assert!(ClockTime::parse("25:00").is_err());
    assert!(ClockTime::parse("noon").is_err());
}

#[test]
fn from_unix_reads_wall_clock() {
    // 1970-01-02 01:02:03 UTC
    let ts = 86_400 + 3_600 + 2 * 60 + 3;
    assert_eq!(
        ClockTime::from_unix(ts, 0).unwrap(),
        ClockTime::new(1, 2, 3).unwrap()
    );
    assert_eq!(
        ClockTime::from_unix(ts, 3_600).unwrap(),
        ClockTime::new(2, 2, 3).unwrap()
    );
}
