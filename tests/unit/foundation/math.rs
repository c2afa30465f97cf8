use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(255, 0), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u8(200, 128), 100);
}

#[test]
fn percent_offset_stays_in_range() {
    assert_eq!(percent_offset(0.0, 100), 0);
    assert_eq!(percent_offset(100.0, 100), 100);
    assert_eq!(percent_offset(50.0, 101), 51);
    assert_eq!(percent_offset(150.0, 10), 10);
    assert_eq!(percent_offset(-5.0, 10), 0);
    assert_eq!(percent_offset(50.0, 0), 0);
}
