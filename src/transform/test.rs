use {super::*, approx::assert_abs_diff_eq, core::f64::consts::PI, rustfft::num_traits::Zero};

fn line(n: usize, seed: f64) -> Vec<Complex64> {
    (0..n)
        .map(|k| {
            let k = k as f64;
            Complex64::new((seed * (k + 1.0)).sin(), (seed * (2.0 * k + 3.0)).cos())
        })
        .collect()
}

fn assert_lines_eq(a: &[Complex64], b: &[Complex64], epsilon: f64) {
    assert_eq!(a.len(), b.len());
    for (a, b) in a.iter().zip(b) {
        assert_abs_diff_eq!(a.re, b.re, epsilon = epsilon);
        assert_abs_diff_eq!(a.im, b.im, epsilon = epsilon);
    }
}

#[test]
fn sizes() {
    assert!(fft_fit(1));
    assert!(fft_fit(16));
    assert!(fft_fit(18));
    assert!(fft_fit(96));
    assert!(!fft_fit(0));
    assert!(!fft_fit(10));
    assert!(!fft_fit(14));

    assert_eq!(dealiased_nxd(2), 3);
    assert_eq!(dealiased_nzd(2), 6);
    assert_eq!(dealiased_nxd(10), 16);
    assert_eq!(dealiased_nzd(5), 16);
    assert_eq!(dealiased_nxd(64), 96);
    assert_eq!(dealiased_nzd(64), 192);
}

#[test]
fn folding() {
    assert_eq!(fold(0, 6), 0);
    assert_eq!(fold(2, 6), 2);
    assert_eq!(fold(-1, 6), 5);
    assert_eq!(fold(-2, 6), 4);
}

#[test]
fn realified_wraps() {
    let l = vec![Complex64::new(1.0, 2.0), Complex64::new(3.0, 4.0)];

    assert_abs_diff_eq!(realified(&l, 0), 1.0);
    assert_abs_diff_eq!(realified(&l, 1), 2.0);
    assert_abs_diff_eq!(realified(&l, 3), 4.0);
    assert_abs_diff_eq!(realified(&l, 4), 1.0);
    assert_abs_diff_eq!(realified(&l, 6), 3.0);

    let mut l = l;
    *realified_mut(&mut l, 5) = -1.0;
    assert_abs_diff_eq!(l[0].im, -1.0);
}

#[test]
fn spanwise_round_trip() {
    let t = Transforms::new(16, 16);
    let original = line(16, 0.37);

    let mut x = original.clone();
    t.fft(&mut x);
    t.ift(&mut x);
    assert_lines_eq(&x, &original, 1.0E-12);

    let mut x = original.clone();
    t.ift(&mut x);
    t.fft(&mut x);
    assert_lines_eq(&x, &original, 1.0E-12);
}

#[test]
fn spanwise_single_mode() {
    let t = Transforms::new(16, 12);
    let mut x = vec![Complex64::zero(); 12];
    x[1] = Complex64::new(0.5, 0.0);
    x[11] = Complex64::new(0.5, 0.0);
    t.ift(&mut x);

    for (j, x) in x.iter().enumerate() {
        assert_abs_diff_eq!(x.re, (2.0 * PI * j as f64 / 12.0).cos(), epsilon = 1.0E-14);
        assert_abs_diff_eq!(x.im, 0.0, epsilon = 1.0E-14);
    }
}

#[test]
fn streamwise_round_trip() {
    let t = Transforms::new(16, 16);
    let original = line(16, 0.91);

    let mut x = original.clone();
    t.rft(&mut x);
    t.hft(&mut x);
    assert_lines_eq(&x, &original, 1.0E-12);

    let mut x = original.clone();
    t.hft(&mut x);
    t.rft(&mut x);
    assert_lines_eq(&x, &original, 1.0E-12);
}

#[test]
fn streamwise_synthesis() {
    let n = 8;
    let t = Transforms::new(n, 6);

    // mean 1, Nyquist 0.25, and 0.5*exp(i*pi*j*3/n) + c.c.
    let mut x = vec![Complex64::zero(); n];
    x[0] = Complex64::new(1.0, 0.25);
    x[3] = Complex64::new(0.5, 0.0);
    t.rft(&mut x);

    for j in 0..2 * n {
        let expected = 1.0
            + 0.25 * if j % 2 == 0 { 1.0 } else { -1.0 }
            + (PI * (3 * j) as f64 / n as f64).cos();
        assert_abs_diff_eq!(realified(&x, j), expected, epsilon = 1.0E-14);
    }
}

#[test]
fn odd_streamwise_size() {
    let t = Transforms::new(3, 6);
    let original = vec![
        Complex64::new(0.2, -0.1),
        Complex64::new(0.7, 0.3),
        Complex64::new(-0.4, 0.9),
    ];

    let mut x = original.clone();
    t.rft(&mut x);
    t.hft(&mut x);
    assert_lines_eq(&x, &original, 1.0E-14);
}
