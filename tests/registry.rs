#[cfg(feature = "fnv")]
use arith_parser::registry::FnvHashRegistry;
use arith_parser::registry::{HashRegistry, LinearRegistry, Registry};
use arith_parser::BUILTIN_FUNCTIONS;
use rand::distributions::{Alphanumeric, Slice};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_name<V>(rng: &mut impl Rng, names: &[(&str, V)]) -> String {
    let name = Slice::new(names).unwrap();
    match rng.gen_range(0..3) {
        // a registered name
        0 => rng.sample(name).0.to_owned(),
        // a prefix of a registered name, usually a miss
        1 => {
            let full = rng.sample(name).0;
            full[..rng.gen_range(0..=full.len())].to_owned()
        }
        // noise
        _ => (0..rng.gen_range(1..6))
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect(),
    }
}

macro_rules! make_test {
    ($name:ident, $struct:ident, $factory:ident) => {
        mod $name {
            use super::*;

            #[test]
            fn matches_linear_reference() {
                let linear = LinearRegistry::from_vec(BUILTIN_FUNCTIONS);
                let registry = $struct::$factory(BUILTIN_FUNCTIONS);

                let mut rng = StdRng::from_seed([0; 32]);
                for _ in 0..500 {
                    let name = random_name(&mut rng, &BUILTIN_FUNCTIONS);
                    let args = [rng.gen_range(-10.0..10.0)];
                    match (linear.get(&name), registry.get(&name)) {
                        (Some(left), Some(right)) => {
                            assert_eq!(left(&args).to_bits(), right(&args).to_bits(), "{name}");
                        }
                        (None, None) => {}
                        (left, right) => panic!(
                            "{name}: linear found {}, {} found {}",
                            left.is_some(),
                            stringify!($name),
                            right.is_some()
                        ),
                    }
                }
            }
        }
    };
}

make_test! {hash, HashRegistry, from_iter}
#[cfg(feature = "fnv")]
make_test! {fnv, FnvHashRegistry, from_iter_hasher}
