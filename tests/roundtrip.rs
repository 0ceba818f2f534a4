use arith_parser::parse;
use arith_parser::tree::Op;
use float_cmp::approx_eq;
use rand::distributions::Slice;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::WeightedIndex;

const VARIABLES: [&str; 4] = ["x", "y", "zed", "_v2"];

fn random_expr(rng: &mut StdRng, depth: u32) -> String {
    let weights = if depth == 0 {
        [2, 2, 0, 0, 0, 0]
    } else {
        [2, 2, 4, 2, 1, 2]
    };
    let form = WeightedIndex::new(weights).unwrap();
    match rng.sample(&form) {
        0 => {
            if rng.gen_bool(0.5) {
                rng.gen_range(1..10).to_string()
            } else {
                format!("{}.{}", rng.gen_range(1..10), rng.gen_range(0..100))
            }
        }
        1 => {
            let var = Slice::new(&VARIABLES).unwrap();
            (*rng.sample(var)).to_owned()
        }
        2 => {
            let op = Slice::new(&['+', '-', '*', '/']).unwrap();
            format!(
                "{}{}{}",
                random_expr(rng, depth - 1),
                rng.sample(op),
                random_expr(rng, depth - 1)
            )
        }
        3 => format!("({})", random_expr(rng, depth - 1)),
        4 => format!("-({})", random_expr(rng, depth - 1)),
        5 => match rng.gen_range(0..4) {
            0 => format!("sin({})", random_expr(rng, depth - 1)),
            1 => format!("sqrt({})", random_expr(rng, depth - 1)),
            2 => format!(
                "max({}, {})",
                random_expr(rng, depth - 1),
                random_expr(rng, depth - 1)
            ),
            _ => "pi()".to_owned(),
        },
        _ => unreachable!(),
    }
}

// Optimizing merges constants, which legitimately reorders float rounding, and a reciprocal of a
// pathological cancellation can blow an ulp of difference up to overflow. Past a huge magnitude
// only joint divergence is checked.
fn equivalent(left: f64, right: f64) -> bool {
    const HUGE: f64 = 1e12;
    if left.is_nan() || right.is_nan() {
        left.is_nan() && right.is_nan()
    } else if left.is_finite() && right.is_finite() {
        let scale = left.abs().max(right.abs()).max(1.0);
        approx_eq!(f64, left, right, epsilon = 1e-9 * scale, ulps = 8) || scale >= HUGE
    } else {
        left.abs().min(right.abs()) >= HUGE
    }
}

#[test]
fn random_expressions() {
    let mut rng = StdRng::from_seed([17; 32]);
    for _ in 0..100 {
        let source = random_expr(&mut rng, 3);
        let tree = parse(&source).unwrap_or_else(|err| panic!("{source}: {err}"));
        let keys = tree.keys().to_vec();

        // the canonical form reparses to the same behavior
        let printed = tree.serialize();
        let reparsed =
            parse(&printed).unwrap_or_else(|err| panic!("{source} -> {printed}: {err}"));
        assert_eq!(reparsed.keys(), keys, "{source} -> {printed}");

        let mut optimized = tree.clone();
        optimized.optimize();

        if tree.keys().is_empty() {
            // a tree needing no variables optimizes all the way to a constant
            assert!(
                matches!(optimized, Op::Const(_)),
                "{source} -> {}",
                optimized.serialize()
            );
        }

        let mut twice = optimized.clone();
        twice.optimize();

        if optimized.keys() == keys {
            for _ in 0..4 {
                let args: Vec<f64> = keys.iter().map(|_| rng.gen_range(0.5..2.5)).collect();
                let expected = tree.evaluate(&args);
                let ctx = || format!("{source} with {args:?}");
                assert!(
                    equivalent(expected, reparsed.evaluate(&args)),
                    "reparse of {}",
                    ctx()
                );
                assert!(
                    equivalent(expected, optimized.evaluate(&args)),
                    "optimize of {}",
                    ctx()
                );
                assert!(
                    equivalent(expected, twice.evaluate(&args)),
                    "re-optimize of {}",
                    ctx()
                );
            }
        } else {
            // the zero-product collapse is the one legal key change: everything
            // gone and the tree pinned at zero
            assert!(optimized.keys().is_empty(), "{source}");
            assert_eq!(optimized.evaluate(&[]), 0.0, "{source}");
            assert_eq!(twice.evaluate(&[]), 0.0, "{source}");
        }
    }
}

#[test]
fn guarded_evaluation_of_random_expressions() {
    let mut rng = StdRng::from_seed([3; 32]);
    for _ in 0..50 {
        let source = random_expr(&mut rng, 2);
        let tree = parse(&source).unwrap();
        let guarded = tree.clone().checked();
        let num_keys = tree.keys().len();
        if num_keys > 0 {
            assert!(guarded.evaluate(&[]).is_nan(), "{source}");
            assert!(guarded.evaluate(&vec![1.0; num_keys - 1]).is_nan(), "{source}");
        }
        // with enough arguments the guard is transparent
        let args: Vec<f64> = (0..num_keys).map(|_| rng.gen_range(0.5..2.5)).collect();
        assert_eq!(
            guarded.evaluate(&args).to_bits(),
            tree.evaluate(&args).to_bits(),
            "{source}"
        );
    }
}
