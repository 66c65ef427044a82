use std::collections::hash_map::DefaultHasher;
use std::f64::consts::{E, FRAC_PI_2, PI};
use std::hash::{Hash, Hasher};

use proptest::prelude::*;

use crate::derivative::derivative;
use crate::error::{EvalError, SampleError};
use crate::eval::eval;
use crate::expr::{BinaryOp, Comparison, Expr, Operation, UnaryOp};
use crate::function::{evaluate, IntervalFunction};
use crate::interval::Interval;
use crate::parse::parse;
use crate::power::{gcd, power_fraction, ExponentShape, PowerEvaluator};
use crate::sampler::{IntervalSampler, SamplingMode};
use crate::support::{first_unsupported, is_unsupported, UnsupportedOperatorChecker};
use crate::tuple::{IntervalTuple, IntervalTupleList};

fn interval(lo: f64, hi: f64) -> Interval {
    Interval::new(lo, hi)
}

fn eval_on(definition: &str, lo: f64, hi: f64) -> Interval {
    let expr = parse(definition).expect("parse");
    let function = IntervalFunction::new(expr).expect("supported");
    function.evaluate(interval(lo, hi)).expect("evaluate")
}

fn assert_close(actual: Interval, expected: Interval) {
    assert!(!actual.is_undefined(), "expected {expected}, got undefined");
    assert!(
        (actual.low() - expected.low()).abs() < 1e-12 && (actual.high() - expected.high()).abs() < 1e-12,
        "expected {expected}, got {actual}"
    );
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn undefined_absorbs() {
    let u = Interval::undefined();
    assert!(u.is_undefined());
    assert!((u + interval(1.0, 2.0)).is_undefined());
    assert!((interval(1.0, 2.0) * u).is_undefined());
    assert!(u.powi(2).is_undefined());
    assert!(u.powf(0.5).is_undefined());
    assert!(u.sqrt().is_undefined());
    assert!(u.negative().is_undefined());
    assert!(u.multiplicative_inverse().is_undefined());
    assert!(u.sin().is_undefined());
    assert!(interval(1.0, 2.0).pow(u).is_undefined());
    assert_eq!(u, Interval::UNDEFINED);
    assert_ne!(u, Interval::zero());
}

#[test]
fn reversed_or_nan_bounds_are_undefined() {
    assert!(interval(2.0, 1.0).is_undefined());
    assert!(interval(f64::NAN, 1.0).is_undefined());
    assert!(!Interval::whole().is_undefined());
}

#[test]
fn sign_predicates_exclude_zero() {
    assert!(interval(0.5, 2.0).is_positive());
    assert!(!interval(0.0, 2.0).is_positive());
    assert!(interval(-2.0, -0.5).is_negative());
    assert!(!interval(-2.0, 0.0).is_negative());
    assert!(!interval(-1.0, 1.0).is_positive());
    assert!(!interval(-1.0, 1.0).is_negative());
    assert!(!Interval::undefined().is_negative());
}

#[test]
fn singleton_integer() {
    assert!(Interval::singleton(3.0).is_singleton_integer());
    assert!(Interval::singleton(-7.0).is_singleton_integer());
    assert!(!Interval::singleton(2.5).is_singleton_integer());
    assert!(!interval(3.0, 4.0).is_singleton_integer());
    assert!(!Interval::singleton(f64::INFINITY).is_singleton_integer());
}

#[test]
fn e_is_recognized_bit_exactly() {
    assert!(Interval::singleton(E).is_exactly_e());
    assert!(!Interval::singleton(f64::from_bits(E.to_bits() + 1)).is_exactly_e());
    assert!(!interval(E, 3.0).is_exactly_e());
}

#[test]
fn reciprocal_needs_a_sign() {
    assert_eq!(interval(2.0, 4.0).multiplicative_inverse(), interval(0.25, 0.5));
    assert_eq!(interval(-4.0, -2.0).multiplicative_inverse(), interval(-0.5, -0.25));
    assert!(interval(-1.0, 1.0).multiplicative_inverse().is_undefined());
    assert!(Interval::zero().multiplicative_inverse().is_undefined());
    assert_eq!(interval(0.0, 2.0).multiplicative_inverse(), interval(0.5, f64::INFINITY));
    assert!((interval(1.0, 2.0) / interval(-1.0, 1.0)).is_undefined());
}

#[test]
fn arithmetic_corners() {
    assert_eq!(interval(1.0, 2.0) + interval(3.0, 5.0), interval(4.0, 7.0));
    assert_eq!(interval(1.0, 2.0) - interval(3.0, 5.0), interval(-4.0, -1.0));
    assert_eq!(interval(-1.0, 2.0) * interval(3.0, 5.0), interval(-5.0, 10.0));
    assert_eq!(interval(1.0, 2.0) / interval(4.0, 8.0), interval(0.125, 0.5));
    assert_eq!(-interval(1.0, 2.0), interval(-2.0, -1.0));
    assert_eq!(Interval::zero() * Interval::whole(), Interval::zero());
}

#[test]
fn integer_powers_are_tight() {
    assert_eq!(interval(-1.0, 2.0).powi(2), interval(0.0, 4.0));
    assert_eq!(interval(-3.0, -2.0).powi(2), interval(4.0, 9.0));
    assert_eq!(interval(-1.0, 2.0).powi(3), interval(-1.0, 8.0));
    assert_eq!(interval(-5.0, 5.0).powi(0), Interval::one());
    assert_eq!(interval(1.0, 2.0).powi(-2), interval(0.25, 1.0));
}

#[test]
fn real_powers_only_see_the_non_negative_part() {
    assert_eq!(interval(4.0, 9.0).powf(0.5), interval(2.0, 3.0));
    assert_eq!(interval(-4.0, 9.0).powf(0.5), interval(0.0, 3.0));
    assert!(interval(-4.0, -1.0).powf(0.5).is_undefined());
    assert!(Interval::zero().powf(-0.5).is_undefined());
    assert_eq!(interval(0.0, 4.0).powf(-0.5), interval(0.5, f64::INFINITY));
}

#[test]
fn roots_follow_parity() {
    assert_eq!(interval(-8.0, -1.0).nth_root(3), interval(-2.0, -1.0));
    assert!(interval(-8.0, -1.0).nth_root(2).is_undefined());
    assert_eq!(interval(4.0, 16.0).sqrt(), interval(2.0, 4.0));
    assert!(interval(4.0, 16.0).nth_root(0).is_undefined());
    assert_eq!(interval(-8.0, 8.0).nth_root(3), interval(-2.0, 2.0));
    assert_eq!(interval(4.0, 16.0).nroot(Interval::singleton(2.0)), interval(2.0, 4.0));
    assert!(interval(4.0, 16.0).nroot(Interval::singleton(2.5)).is_undefined());
}

#[test]
fn interval_exponent_uses_corners() {
    assert_eq!(interval(2.0, 4.0).pow(interval(1.0, 2.0)), interval(2.0, 16.0));
    assert_eq!(interval(0.25, 4.0).pow(interval(-1.0, 1.0)), interval(0.25, 4.0));
    assert!(interval(-4.0, -2.0).pow(interval(1.0, 2.0)).is_undefined());
}

#[test]
fn elementary_functions() {
    let sin = interval(0.0, PI).sin();
    assert_eq!(sin.high(), 1.0);
    assert!(sin.low().abs() < 1e-15);
    assert_eq!(interval(0.0, 7.0).cos(), interval(-1.0, 1.0));
    assert_eq!(interval(3.0, 3.5).cos().low(), -1.0);
    assert!(interval(1.0, 2.0).tan().is_undefined());
    assert!(!interval(-1.0, 1.0).tan().is_undefined());
    assert!(interval(FRAC_PI_2 - 0.1, FRAC_PI_2 + 0.1).sec().is_undefined());
    assert!(interval(-1.0, 1.0).cot().is_undefined());
    assert!(interval(-3.0, -0.5).ln().is_undefined());
    assert_eq!(interval(0.0, 1.0).ln(), interval(f64::NEG_INFINITY, 0.0));
    assert!(interval(1.5, 2.0).asin().is_undefined());
    assert_eq!(interval(-3.0, 2.0).abs(), interval(0.0, 3.0));
    assert_eq!(interval(-1.0, 2.0).cosh().low(), 1.0);
}

#[test]
fn hull_skips_undefined() {
    let hull = interval(1.0, 2.0).hull(interval(4.0, 5.0));
    assert_eq!(hull, interval(1.0, 5.0));
    assert!(hull.contains(3.0));
    assert!(!hull.contains(5.5));
    assert!(!Interval::undefined().contains(0.0));
    assert_eq!(Interval::undefined().hull(interval(4.0, 5.0)), interval(4.0, 5.0));
}

#[test]
fn equal_intervals_hash_alike() {
    assert_eq!(interval(-0.0, 1.0), interval(0.0, 1.0));
    assert_eq!(hash_of(&interval(-0.0, 1.0)), hash_of(&interval(0.0, 1.0)));
    assert_eq!(hash_of(&Interval::undefined()), hash_of(&Interval::UNDEFINED));
    assert_eq!(interval(1.0, 2.5).to_string(), "[1, 2.5]");
    assert_eq!(Interval::undefined().to_string(), "undefined");
}

proptest! {
    #[test]
    fn integer_power_is_repeated_product(lo in -50.0f64..50.0, width in 0.0f64..20.0, n in 1i64..8) {
        let x = interval(lo, lo + width);
        prop_assume!(x.low() >= 0.0 || x.high() <= 0.0);
        let product = (1..n).fold(x, |acc, _| acc * x);
        prop_assert_eq!(x.powi(n), product);
    }

    #[test]
    fn integer_power_inside_product_across_zero(lo in -20i32..0, hi in 1i32..20, n in 1i64..6) {
        let x = interval(f64::from(lo), f64::from(hi));
        let product = (1..n).fold(x, |acc, _| acc * x);
        let power = x.powi(n);
        prop_assert!(product.low() <= power.low() && power.high() <= product.high());
    }
}

#[test]
fn evaluate_x_squared() {
    assert_eq!(eval_on("x^2", 1.0, 2.0), interval(1.0, 2.0).powi(2));
}

#[test]
fn evaluate_x_to_e() {
    assert_eq!(eval_on("x^e", 1.0, 2.0), interval(1.0, 2.0).powf(E));
}

#[test]
fn evaluate_e_to_x_uses_exp() {
    assert_eq!(eval_on("e^x", 0.0, 1.0), interval(0.0, 1.0).exp());
}

#[test]
fn evaluate_negative_integer_power() {
    assert_eq!(eval_on("x^-2", 1.0, 2.0), interval(1.0, 2.0).powi(2).multiplicative_inverse());
}

#[test]
fn evaluate_fraction_powers() {
    assert_eq!(eval_on("x^(1/2)", 1.0, 16.0), interval(1.0, 16.0).nth_root(2));
    assert_eq!(eval_on("x^(1/4)", 1.0, 16.0), interval(1.0, 16.0).nth_root(4));
    assert_close(eval_on("x^(2/3)", 1.0, 16.0), interval(1.0, 16.0).powi(2).nth_root(3));
    assert_close(
        eval_on("x^(-3/2)", 9.0, 10.0),
        interval(9.0, 10.0).powi(3).sqrt().multiplicative_inverse(),
    );
    assert_eq!(eval_on("x^0.5", 9.0, 10.0), interval(9.0, 10.0).sqrt());
}

#[test]
fn odd_denominator_on_negative_base() {
    for definition in ["x^(-1/3)", "x^(1/-3)", "x^-(1/3)"] {
        assert_eq!(eval_on(definition, 1.0, 1.0), Interval::one(), "{definition}");
        assert_eq!(eval_on(definition, -1.0, -1.0), Interval::one().negative(), "{definition}");
        assert!(eval_on(definition, 0.0, 0.0).is_undefined(), "{definition}");
    }
}

#[test]
fn even_numerator_on_both_sides_of_zero() {
    let expected = interval(0.6715486801956773, 0.6745703694731457);
    for definition in ["x^-(2/9)", "x^(-2/9)", "x^(2/-9)"] {
        assert_close(eval_on(definition, -6.0, -5.88), expected);
        assert_close(eval_on(definition, 5.88, 6.0), expected);
    }
    assert!(eval_on("x^(-2/9)", 0.0, 0.0).is_undefined());
}

#[test]
fn power_of_power() {
    assert_close(
        eval_on("(((x)^(1/9))^-1)^2", -4.0, -4.0),
        Interval::singleton(0.7348672461377986),
    );
}

#[test]
fn cube_root_across_the_negative_range() {
    assert_close(eval_on("x^(1/3)", -27.0, -8.0), interval(-3.0, -2.0));
    assert_close(eval_on("x^(2/3)", -27.0, -8.0), interval(4.0, 9.0));
    assert!(eval_on("x^(1/2)", -4.0, -1.0).is_undefined());
    assert!(eval_on("x^(3/6)", -4.0, -1.0).is_undefined());
}

#[test]
fn other_compound_exponents_fall_back_to_real_power() {
    assert_eq!(eval_on("x^(1+2)", -2.0, -1.0), interval(-2.0, -1.0).powi(3));
    assert!(eval_on("x^(0.5/1)", -2.0, -1.0).is_undefined());
}

#[test]
fn failed_fraction_falls_back_without_error() {
    let expr = parse("x^(1e30/3e30)").expect("parse");
    let result = evaluate(Interval::singleton(-1.0), &expr).expect("fail-soft");
    assert!(result.is_undefined());
}

#[test]
fn exponent_shapes() {
    let fraction = parse("1/3").expect("parse");
    assert!(matches!(
        ExponentShape::classify(&fraction),
        ExponentShape::ExactFraction { .. }
    ));
    let negated = parse("-(1/3)").expect("parse");
    assert!(matches!(
        ExponentShape::classify(&negated),
        ExponentShape::NegatedExactFraction { .. }
    ));
    assert_eq!(ExponentShape::classify(&parse("1+3").expect("parse")), ExponentShape::Other);
    assert_eq!(ExponentShape::classify(&parse("-(1+3)").expect("parse")), ExponentShape::Other);
}

#[test]
fn power_evaluator_only_for_power_nodes() {
    let power = parse("x^3").expect("parse");
    let evaluator = PowerEvaluator::for_node(&power).expect("power node");
    assert_eq!(evaluator.evaluate(interval(1.0, 2.0)), Ok(interval(1.0, 8.0)));
    assert!(PowerEvaluator::for_node(&Expr::X).is_none());
}

#[test]
fn fraction_reduction() {
    assert_eq!(gcd(12, 18), 6);
    assert_eq!(gcd(0, 5), 5);
    assert_eq!(gcd(0, 0), 0);
    let base = Interval::singleton(-8.0);
    assert!(power_fraction(base, 0, 0).is_none());
    assert!(power_fraction(base, 1, 0).is_none());
    assert_eq!(power_fraction(base, 2, 6), power_fraction(base, 1, 3));
    assert_eq!(power_fraction(base, 1, -3), power_fraction(base, -1, 3));
    assert!(power_fraction(base, 1, 2).is_none());
    assert_eq!(power_fraction(base, 2, 2), Some(base));
}

#[test]
fn support_filter_rejects_variable_and_huge_exponents() {
    assert!(is_unsupported(&parse("x^x").expect("parse")));
    assert!(is_unsupported(&parse("x^(1/x)").expect("parse")));
    assert!(is_unsupported(&parse("x^100").expect("parse")));
    assert!(is_unsupported(&parse("x^-100").expect("parse")));
    assert!(is_unsupported(&parse("x^(0/0)").expect("parse")));
    assert!(!is_unsupported(&parse("x^99.5").expect("parse")));
    assert!(!is_unsupported(&parse("x^-99").expect("parse")));
    assert!(!is_unsupported(&parse("x^(1/3)").expect("parse")));
}

#[test]
fn support_filter_multiply_is_exclusive_or_on_vectors() {
    assert!(!is_unsupported(&parse("2*x").expect("parse")));
    assert!(is_unsupported(&parse("x*(1, 2)").expect("parse")));
    assert!(is_unsupported(&parse("(1, 2)*x").expect("parse")));
    assert!(!is_unsupported(&parse("(1, x)*(x, 1)").expect("parse")));
}

#[test]
fn support_filter_table() {
    for definition in [
        "x + 1",
        "x - 1",
        "x / 2",
        "nroot(x, 3)",
        "diff(x^2)",
        "sin(x) + cos(x) + tan(x) + sec(x) + csc(x) + cot(x)",
        "asin(x) + acos(x) + atan(x) + sinh(x) + cosh(x) + tanh(x)",
        "sqrt(x) + exp(x) + ln(x) + log10(x) + log2(x) + abs(x)",
        "if(x < 0, -x)",
        "if(x < 0, -x, x)",
        "x",
    ] {
        assert!(!is_unsupported(&parse(definition).expect("parse")), "{definition}");
    }
    for definition in ["floor(x)", "ceil(x)", "round(x)", "sgn(x)", "min(x, 1)", "max(x, 1)", "1 + floor(x)^2"] {
        assert!(is_unsupported(&parse(definition).expect("parse")), "{definition}");
    }
    assert_eq!(
        first_unsupported(&parse("sin(x) + floor(x)").expect("parse")),
        Some(Operation::Unary(UnaryOp::Floor))
    );
}

#[test]
fn checker_looks_at_one_node() {
    let checker = UnsupportedOperatorChecker;
    let expr = parse("sin(floor(x))").expect("parse");
    assert!(!checker.check(&expr));
    assert!(is_unsupported(&expr));
}

#[test]
fn unsupported_trees_are_refused() {
    let err = IntervalFunction::new(parse("floor(x)").expect("parse")).expect_err("unsupported");
    assert_eq!(err, EvalError::Unsupported(Operation::Unary(UnaryOp::Floor)));
    let err = evaluate(interval(0.0, 1.0), &parse("max(x, 1)").expect("parse")).expect_err("unsupported");
    assert_eq!(err, EvalError::Unsupported(Operation::Binary(BinaryOp::Max)));
}

#[test]
fn vector_products() {
    assert_eq!(eval_on("(1, x)*(x, 1)", 1.0, 2.0), interval(2.0, 4.0));
    let mismatch = evaluate(interval(0.0, 1.0), &parse("(1, 2)*(1, 2, 3)").expect("parse"));
    assert_eq!(mismatch, Err(EvalError::DimensionMismatch(2, 3)));
    assert_eq!(
        evaluate(interval(0.0, 1.0), &parse("(1, 2)").expect("parse")),
        Err(EvalError::VectorValued)
    );
}

#[test]
fn conditional_branches() {
    assert_eq!(eval_on("if(x < 0, -x, x)", -2.0, -1.0), interval(1.0, 2.0));
    assert_eq!(eval_on("if(x < 0, -x, x)", 1.0, 2.0), interval(1.0, 2.0));
    assert_eq!(eval_on("if(x < 0, -x, x)", -1.0, 2.0), interval(-2.0, 2.0));
    assert!(eval_on("if(x < 0, -x)", 1.0, 2.0).is_undefined());
    assert_eq!(eval_on("if(x >= 1, x)", 1.0, 2.0), interval(1.0, 2.0));
}

#[test]
fn derivatives() {
    assert_eq!(eval_on("diff(x^2)", 1.0, 2.0), interval(2.0, 4.0));
    assert_eq!(eval_on("diff(3*x + 1)", -5.0, 5.0), Interval::singleton(3.0));
    assert_close(eval_on("diff(x^(1/3))", -8.0, -8.0), Interval::singleton(1.0 / 12.0));
    assert_close(eval_on("diff(sin(x))", 0.0, 0.0), Interval::one());
    assert_eq!(
        derivative(&parse("floor(x)").expect("parse")),
        Err(EvalError::NotDifferentiable(Operation::Unary(UnaryOp::Floor)))
    );
}

#[test]
fn point_evaluation() {
    assert_eq!(eval(&parse("sgn(x)").expect("parse"), 0.0), 0.0);
    assert_eq!(eval(&parse("nroot(x, 3)").expect("parse"), -8.0), -2.0);
    assert_eq!(eval(&parse("floor(x) + 1").expect("parse"), 2.7), 3.0);
    assert!(eval(&parse("if(x > 0, x)").expect("parse"), -1.0).is_nan());
    assert!(parse("x^2").expect("parse").evaluate_constant().is_nan());
    assert_eq!(parse("-(2/4)").expect("parse").evaluate_constant(), -0.5);
}

#[test]
fn parser_shapes() {
    assert_eq!(parse("x^-2").expect("parse"), Expr::X.pow(Expr::c(-2.0)));
    assert_eq!(
        parse("x^(-1/3)").expect("parse"),
        Expr::X.pow(Expr::c(-1.0).div(Expr::c(3.0)))
    );
    assert_eq!(
        parse("x^(1/-3)").expect("parse"),
        Expr::X.pow(Expr::c(1.0).div(Expr::c(-3.0)))
    );
    assert_eq!(
        parse("x^-(1/3)").expect("parse"),
        Expr::X.pow(Expr::c(-1.0).mul(Expr::c(1.0).div(Expr::c(3.0))))
    );
    assert_eq!(
        parse("-x^2").expect("parse"),
        Expr::c(-1.0).mul(Expr::X.pow(Expr::c(2.0)))
    );
    assert_eq!(
        parse("2^3^2").expect("parse"),
        Expr::c(2.0).pow(Expr::c(3.0).pow(Expr::c(2.0)))
    );
    assert_eq!(
        parse("if(x <= 1, x, 1)").expect("parse"),
        Expr::when(Expr::X, Comparison::LessEq, Expr::c(1.0), Expr::X, Some(Expr::c(1.0)))
    );
    assert_eq!(parse("arcsin(x)").expect("parse"), Expr::unary(UnaryOp::Asin, Expr::X));
}

#[test]
fn nesting_depth_is_bounded() {
    let nested = |depth: usize| format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(parse(&nested(100)).expect("shallow"), Expr::X);
    let err = parse(&nested(200_000)).expect_err("too deep");
    assert!(err.message.contains("nested too deeply"), "{err}");
    assert!(parse(&format!("{}x", "-".repeat(200_000))).is_err());
    assert!(parse(&format!("x{}", "^x".repeat(200_000))).is_err());
}

#[test]
fn operands_are_reachable_by_position() {
    let expr = parse("x^(1/3)").expect("parse");
    assert_eq!(expr.left(), Some(&Expr::X));
    assert_eq!(expr.right(), Some(&parse("1/3").expect("parse")));
    assert_eq!(Expr::X.left(), None);
    assert_eq!(parse("sin(x)").expect("parse").right(), None);

    let function = IntervalFunction::new(expr.clone()).expect("supported");
    assert_eq!(function.expr(), &expr);
}

#[test]
fn parser_errors_carry_offsets() {
    assert_eq!(parse("x +").expect_err("incomplete").offset, 3);
    assert_eq!(parse("x $ 1").expect_err("bad char").offset, 2);
    assert_eq!(parse("foo(x)").expect_err("unknown").offset, 0);
    assert!(parse("(x, 1").is_err());
}

#[test]
fn display_parses_back() {
    for definition in ["x^(-1/3)", "-(x^2) + sin(x)", "if(x < 0, -x, x)", "nroot(x, 3) * (1, 2)"] {
        let expr = parse(definition).expect("parse");
        assert_eq!(parse(&expr.to_string()).expect("reparse"), expr, "{expr}");
    }
}

#[test]
fn expr_trees_deserialize_from_json() {
    let json = r#"{"Binary":["power","X",{"Binary":["divide",{"Const":1.0},{"Const":3.0}]}]}"#;
    let expr: Expr = serde_json::from_str(json).expect("json tree");
    assert_eq!(expr, parse("x^(1/3)").expect("parse"));
}

fn tuple(lo: f64, hi: f64, y: Option<Interval>) -> IntervalTuple {
    IntervalTuple::new(interval(lo, hi), y)
}

fn sample_list() -> IntervalTupleList {
    (0..4)
        .map(|k| {
            let lo = f64::from(k);
            tuple(lo, lo + 1.0, Some(interval(lo, lo + 1.0)))
        })
        .collect()
}

#[test]
fn append_and_prepend_skip_empty_lists() {
    let mut list = sample_list();
    let before = list.clone();
    list.append(IntervalTupleList::new());
    list.prepend(IntervalTupleList::new());
    let empty_y: IntervalTupleList = vec![
        tuple(4.0, 5.0, None),
        tuple(5.0, 6.0, Some(Interval::undefined())),
    ]
    .into();
    list.append(empty_y.clone());
    list.prepend(empty_y);
    assert_eq!(list, before);
}

#[test]
fn append_and_prepend_keep_order() {
    let mut list: IntervalTupleList = vec![tuple(1.0, 2.0, Some(Interval::one()))].into();
    list.append(vec![tuple(2.0, 3.0, None), tuple(3.0, 4.0, Some(Interval::one()))].into());
    list.prepend(vec![tuple(0.0, 1.0, Some(Interval::zero()))].into());
    assert_eq!(list.count(), 4);
    assert!(list.is_ascending());
    assert_eq!(list.get(0).map(IntervalTuple::x), Some(interval(0.0, 1.0)));
    assert_eq!(list.value_at(0), Some(Interval::zero()));
    assert_eq!(list.value_at(2), None);
    assert!(list.get(4).is_none());
    assert_eq!(list.value_at(9), None);
}

#[test]
fn cut_from_drops_samples_past_the_right_edge() {
    let mut list = sample_list();
    list.cut_from(2.5);
    assert_eq!(list.count(), 2);
    assert_eq!(list.last().map(IntervalTuple::x), Some(interval(1.0, 2.0)));
    let once = list.clone();
    list.cut_from(2.5);
    assert_eq!(list, once);
    list.cut_from(2.0);
    assert_eq!(list, once);
}

#[test]
fn cut_to_drops_samples_past_the_left_edge() {
    let mut list = sample_list();
    list.cut_to(1.0);
    assert_eq!(list.count(), 3);
    assert_eq!(list.first().map(IntervalTuple::x), Some(interval(1.0, 2.0)));
    let once = list.clone();
    list.cut_to(1.0);
    assert_eq!(list, once);
}

#[test]
fn tuple_lists_compare_structurally() {
    let a = sample_list();
    let mut b = sample_list();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(a.to_string(), b.to_string());
    b.clear();
    assert!(b.is_empty());
    assert_ne!(a, b);
    let one: IntervalTupleList = vec![tuple(0.0, 1.0, None)].into();
    assert_eq!(one.to_string(), "([0, 1], -)");
}

#[test]
fn sampler_covers_the_domain() {
    let sampler = IntervalSampler::new(parse("x^2").expect("parse"), interval(0.0, 4.0), 4).expect("sampler");
    assert_eq!(sampler.mode(), SamplingMode::Rigorous);
    assert_eq!(sampler.samples().count(), 4);
    assert_eq!(sampler.samples().value_at(3), Some(interval(9.0, 16.0)));
    assert_eq!(sampler.domain(), interval(0.0, 4.0));
    assert!(sampler.samples().is_ascending());
}

#[test]
fn panning_evaluates_only_new_pieces() {
    let mut sampler = IntervalSampler::new(parse("x^2").expect("parse"), interval(0.0, 4.0), 4).expect("sampler");
    assert_eq!(sampler.pan(interval(1.0, 5.0)), Ok(1));
    assert_eq!(sampler.samples().count(), 4);
    assert_eq!(sampler.samples().first().map(IntervalTuple::x), Some(interval(1.0, 2.0)));
    assert_eq!(sampler.samples().value_at(3), Some(interval(16.0, 25.0)));

    assert_eq!(sampler.pan(interval(-1.0, 3.0)), Ok(2));
    assert_eq!(sampler.samples().count(), 4);
    assert_eq!(sampler.samples().first().map(IntervalTuple::x), Some(interval(-1.0, 0.0)));
    assert_eq!(sampler.samples().last().map(IntervalTuple::x), Some(interval(2.0, 3.0)));
    assert!(sampler.samples().is_ascending());
}

#[test]
fn disjoint_pan_resamples() {
    let mut sampler = IntervalSampler::new(Expr::X, interval(0.0, 4.0), 4).expect("sampler");
    assert_eq!(sampler.pan(interval(10.0, 12.0)), Ok(2));
    assert_eq!(sampler.samples().count(), 2);
    assert_eq!(sampler.domain(), interval(10.0, 12.0));
}

#[test]
fn pieces_without_values_are_not_cached() {
    let mut sampler =
        IntervalSampler::new(parse("x^(1/2)").expect("parse"), interval(-2.0, 2.0), 4).expect("sampler");
    assert!(sampler.samples().value_at(0).is_some_and(Interval::is_undefined));
    assert_eq!(sampler.pan(interval(-4.0, 0.0)), Ok(2));
    assert_eq!(sampler.samples().count(), 2);
    assert_eq!(sampler.samples().first().map(IntervalTuple::x), Some(interval(-2.0, -1.0)));
}

#[test]
fn unsupported_trees_fall_back_to_points() {
    let mut sampler = IntervalSampler::new(parse("floor(x)").expect("parse"), interval(0.0, 2.0), 2).expect("sampler");
    assert_eq!(sampler.mode(), SamplingMode::PointFallback);
    assert_eq!(sampler.samples().value_at(1), Some(Interval::singleton(1.0)));

    sampler.reset(parse("x + 1").expect("parse"));
    assert_eq!(sampler.mode(), SamplingMode::Rigorous);
    assert_eq!(sampler.samples().value_at(1), Some(interval(2.0, 3.0)));
}

#[test]
fn sampler_rejects_bad_requests() {
    assert_eq!(
        IntervalSampler::new(Expr::X, interval(0.0, 1.0), 0).err(),
        Some(SampleError::NoPieces)
    );
    assert!(matches!(
        IntervalSampler::new(Expr::X, Interval::singleton(1.0), 4),
        Err(SampleError::InvalidDomain(_))
    ));
    assert!(matches!(
        IntervalSampler::with_max_pieces(Expr::X, interval(0.0, 1.0), 8, 4),
        Err(SampleError::TooManyPieces { requested: 8, limit: 4 })
    ));
    assert!(matches!(
        IntervalSampler::new(Expr::X, interval(-1e308, 1e308), 2),
        Err(SampleError::InvalidDomain(_))
    ));
    let mut sampler = IntervalSampler::with_max_pieces(Expr::X, interval(0.0, 4.0), 4, 4).expect("sampler");
    assert!(matches!(
        sampler.pan(interval(0.0, 100.0)),
        Err(SampleError::TooManyPieces { .. })
    ));
    assert_eq!(sampler.samples().count(), 4);
}

#[test]
fn far_pans_are_rejected() {
    let mut sampler = IntervalSampler::new(Expr::X, interval(0.0, 1e-300), 1).expect("sampler");
    assert_eq!(sampler.expr(), &Expr::X);
    let before = sampler.samples().clone();
    assert!(matches!(
        sampler.pan(interval(1e300, 2e300)),
        Err(SampleError::InvalidDomain(_))
    ));
    assert_eq!(sampler.samples(), &before);

    let mut sampler = IntervalSampler::new(Expr::X, interval(0.0, 1.0), 1).expect("sampler");
    assert!(matches!(
        sampler.pan(interval(1e17, 1e17 + 64.0)),
        Err(SampleError::InvalidDomain(_))
    ));
    assert_eq!(sampler.pan(interval(1.0, 2.0)), Ok(1));
}
