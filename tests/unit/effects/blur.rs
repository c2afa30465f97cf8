use super::*;

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = gaussian_blur_rgba8(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_image_is_identity() {
    let (w, h) = (6u32, 5u32);
    let px = [10u8, 20u8, 30u8, 255u8];
    let src = px.repeat((w * h) as usize);
    let out = gaussian_blur_rgba8(&src, w, h, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = gaussian_blur_rgba8(&src, w, h, 2, 1.2).unwrap();

    let nonzero = out.chunks_exact(4).filter(|px| px[0] != 0).count();
    assert!(nonzero > 1);

    let sum: u32 = out.chunks_exact(4).map(|px| u32::from(px[0])).sum();
    assert!((sum as i32 - 255).abs() <= 4);
}

#[test]
fn kernel_sums_to_one_in_q16() {
    let k = gaussian_kernel_q16(7, 3.0).unwrap();
    assert_eq!(k.len(), 15);
    assert_eq!(k.iter().map(|&v| u64::from(v)).sum::<u64>(), 65536);
    assert!(gaussian_kernel_q16(2, 0.0).is_err());
}

#[test]
fn mismatched_buffer_is_rejected() {
    assert!(gaussian_blur_rgba8(&[0u8; 7], 1, 2, 1, 1.0).is_err());
}
