use fnplot::error::PlotError;
use fnplot::expr::{Expression, Variable};
use fnplot::processing::series_builder::{build, IMAGINARY_EPSILON};
use fnplot::render::chart::finite_runs;

fn sample(src: &str, x_min: f64, x_max: f64, steps: usize) -> Result<fnplot::processing::series_builder::SampledSeries, PlotError> {
    let expression = Expression::parse(src).unwrap();
    let variable = Variable::new("x").unwrap();
    build(x_min, x_max, steps, &expression, &variable, false)
}

#[test]
fn reciprocal_skips_the_pole() {
    let out = sample("1/x", -10.0, 10.0, 50).unwrap();
    assert_eq!(out.real.len(), 50);
    assert_eq!(out.stats.attempted, 51);
    assert_eq!(out.stats.failed, 1);
    assert!(!out.real.x.contains(&0.0));
    assert!(!out.has_imaginary);
    assert!(out.imaginary.is_empty());
    assert_eq!(out.real.x.first(), Some(&-10.0));
    assert_eq!(out.real.x.last(), Some(&10.0));
}

#[test]
fn reciprocal_is_not_joined_across_the_pole() {
    let out = sample("1/x", -10.0, 10.0, 50).unwrap();
    assert_eq!(out.real.len(), 50);
    assert_eq!(out.real.breaks, vec![25]);

    let runs = finite_runs(&out.real);
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].len(), 25);
    assert_eq!(runs[1].len(), 25);
    assert!(runs[0].iter().all(|&(x, y)| x < 0.0 && y < 0.0));
    assert!(runs[1].iter().all(|&(x, y)| x > 0.0 && y > 0.0));
}

#[test]
fn sqrt_has_imaginary_part_left_of_zero() {
    let out = sample("sqrt(x)", -10.0, 10.0, 20).unwrap();
    assert!(out.has_imaginary);
    assert_eq!(out.stats.imaginary_samples, 10);
    assert_eq!(out.real.len(), 21);
    assert_eq!(out.imaginary.len(), 21);
    for (x, im) in out.imaginary.points() {
        if x < 0.0 {
            assert!(im.abs() > IMAGINARY_EPSILON, "expected imaginary part at {x}");
        } else {
            assert_eq!(im, 0.0);
        }
    }
}

#[test]
fn x_values_strictly_increase() {
    let out = sample("sin(x)", -3.0, 7.5, 333).unwrap();
    assert!(out.real.x.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(out.real.len(), 334);
}

#[test]
fn repeated_builds_are_identical() {
    let a = sample("x^3 - 2x + ln(x)", -4.0, 4.0, 100).unwrap();
    let b = sample("x^3 - 2x + ln(x)", -4.0, 4.0, 100).unwrap();
    assert_eq!(a.real.x.len(), b.real.x.len());
    for (p, q) in a.real.points().zip(b.real.points()) {
        assert_eq!(p.0.to_bits(), q.0.to_bits());
        assert_eq!(p.1.to_bits(), q.1.to_bits());
    }
    assert_eq!(a.stats, b.stats);
}

#[test]
fn nothing_evaluable_is_empty_series() {
    let err = sample("1/(x - x)", -1.0, 1.0, 10).unwrap_err();
    assert_eq!(
        err,
        PlotError::EmptySeries {
            x_min: -1.0,
            x_max: 1.0,
            failed: 11
        }
    );
}

#[test]
fn overflow_samples_are_dropped() {
    // exp overflows past ~709.78
    let out = sample("exp(x)", 700.0, 720.0, 20).unwrap();
    assert!(out.stats.failed > 0);
    assert!(out.real.y.iter().all(|y| y.is_finite()));
    assert!(out.real.x.iter().all(|&x| x < 710.0));
}
