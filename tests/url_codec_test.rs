use grade_share::core::tiers::{
    flat_payload, Base64Tier, DEFAULT_BASE64_MAX_LEN, DEFAULT_COMPRESSED_MAX_LEN,
};
use grade_share::domain::ports::{Compressor, ShareTier};
use grade_share::{LzStringCompressor, Module, ModuleList, QueryParams, UrlCodec};
use pretty_assertions::assert_eq;

fn tier_rank(tier: &str) -> usize {
    match tier {
        "compressed" => 0,
        "base64" => 1,
        "legacy" => 2,
        other => panic!("unknown tier {}", other),
    }
}

/// Names built from never-repeating two-byte UTF-8 characters, which lz-string
/// cannot shrink but base64 encodes compactly.
fn high_entropy_modules(count: usize, name_len: usize) -> ModuleList {
    let mut next = 0x0100u32;
    (0..count)
        .map(|i| {
            let name: String = (0..name_len)
                .map(|_| {
                    let c = char::from_u32(next).unwrap();
                    next += 1;
                    c
                })
                .collect();
            Module::new(name, (i % 5 + 1) as f64, 10.0 + (i % 10) as f64 * 0.5)
        })
        .collect()
}

fn round_trip(codec: &UrlCodec, modules: &ModuleList) -> Option<ModuleList> {
    let fragment = codec.encode(modules);
    codec.decode(&QueryParams::parse(&fragment))
}

#[test]
fn test_math_physics_scenario() {
    let codec = UrlCodec::new();
    let modules = vec![
        Module::new("Math", 3.0, 15.5),
        Module::new("Physics", 4.0, 14.2),
    ];

    let fragment = codec.encode(&modules);
    assert!(fragment.starts_with("v2="), "fragment: {}", fragment);

    let decoded = codec.decode(&QueryParams::parse(&fragment)).unwrap();
    assert_eq!(decoded, modules);
    assert_eq!(decoded[0].average, 15.5);
    assert_eq!(decoded[1].average, 14.2);
}

#[test]
fn test_tier_choice_follows_budgets() {
    let codec = UrlCodec::new();
    let mut seen = Vec::new();

    for count in 1..=40 {
        let modules = high_entropy_modules(count, 30);
        let encoded = codec.encode_detailed(&modules).unwrap();

        let json = flat_payload(&modules).unwrap();
        let compressed_len = 3 + LzStringCompressor.compress(&json).unwrap().len();
        let base64_len = Base64Tier::new(DEFAULT_BASE64_MAX_LEN)
            .encode(&modules)
            .unwrap()
            .len();

        let expected = if compressed_len <= DEFAULT_COMPRESSED_MAX_LEN {
            "compressed"
        } else if base64_len <= DEFAULT_BASE64_MAX_LEN {
            "base64"
        } else {
            "legacy"
        };
        assert_eq!(encoded.tier, expected, "count {}", count);
        assert_eq!(
            round_trip(&codec, &modules),
            Some(modules.clone()),
            "count {}",
            count
        );
        seen.push(encoded.tier);
    }

    assert!(seen.contains(&"compressed"));
    assert!(seen.contains(&"base64"));
    assert!(seen.contains(&"legacy"));
}

#[test]
fn test_tier_selection_is_monotonic() {
    let codec = UrlCodec::new();

    let mut last_rank = 0;
    for count in 1..=40 {
        let tier = codec
            .encode_detailed(&high_entropy_modules(count, 30))
            .unwrap()
            .tier;
        let rank = tier_rank(tier);
        assert!(rank >= last_rank, "count {} went back to {}", count, tier);
        last_rank = rank;
    }

    let mut last_rank = 0;
    for count in (1..=400).step_by(20) {
        let modules: ModuleList = (0..count)
            .map(|i| Module::new(format!("Module {:03}", i), 2.0, 12.25))
            .collect();
        let rank = tier_rank(codec.encode_detailed(&modules).unwrap().tier);
        assert!(rank >= last_rank, "count {}", count);
        last_rank = rank;
    }
}

#[test]
fn test_legacy_round_trip_keeps_exact_values() {
    let codec = UrlCodec::new();
    let mut modules = high_entropy_modules(60, 30);
    modules[0] = Module::new("Name with spaces & symbols =?", 0.1 + 0.2, 19.999);

    let encoded = codec.encode_detailed(&modules).unwrap();
    assert_eq!(encoded.tier, "legacy");
    assert!(encoded.fragment.starts_with("m0_name="));

    let decoded = codec.decode(&QueryParams::parse(&encoded.fragment)).unwrap();
    assert_eq!(decoded, modules);
}

#[test]
fn test_incomplete_lists_encode_to_empty() {
    let codec = UrlCodec::new();
    let good = Module::new("Math", 3.0, 15.5);

    let bad_modules = [
        Module::new("", 3.0, 12.0),
        Module::new("  ", 3.0, 12.0),
        Module::new("Physics", 0.0, 12.0),
        Module::new("Physics", -2.0, 12.0),
        Module::new("Physics", 2.0, -0.01),
        Module::new("Physics", 2.0, 20.5),
        Module::new("Physics", 2.0, f64::NAN),
    ];

    for bad in bad_modules {
        assert_eq!(codec.encode(&[good.clone(), bad.clone()]), "", "{:?}", bad);
        assert_eq!(codec.encode(&[bad.clone(), good.clone()]), "", "{:?}", bad);
    }
    assert_eq!(codec.encode(&[]), "");
}

#[test]
fn test_garbage_v2_decodes_to_none() {
    let codec = UrlCodec::new();
    assert_eq!(codec.decode_query("v2=this+is+not+compressed"), None);
    assert_eq!(codec.decode_query("v2=%25%25%25"), None);
    assert_eq!(codec.decode_query("v2="), None);
}

#[test]
fn test_garbage_data_decodes_to_none() {
    let codec = UrlCodec::new();
    assert_eq!(codec.decode_query("data=%%%"), None);
    assert_eq!(codec.decode_query("data=bm90IGpzb24"), None); // "not json"
    assert_eq!(codec.decode_query("data=eyJhIjoxfQ"), None); // {"a":1}
}

#[test]
fn test_legacy_gap_stops_scan() {
    let codec = UrlCodec::new();
    let decoded = codec
        .decode_query("m0_name=Math&m0_coef=3&m0_avg=15.5&m2_name=Art&m2_coef=1&m2_avg=12")
        .unwrap();
    assert_eq!(decoded, vec![Module::new("Math", 3.0, 15.5)]);
}

#[test]
fn test_no_share_data_is_none() {
    let codec = UrlCodec::new();
    assert_eq!(codec.decode_query(""), None);
    assert_eq!(codec.decode_query("utm_source=mail"), None);
    assert_eq!(codec.decode_query("m0_name=Math&m0_coef=&m0_avg=12"), None);
}

#[test]
fn test_decodes_browser_generated_fragments() {
    let codec = UrlCodec::new();
    // base64 of ["Math",3,15.5] as a browser would emit it
    let decoded = codec.decode_query("data=WyJNYXRoIiwzLDE1LjVd").unwrap();
    assert_eq!(decoded, vec![Module::new("Math", 3.0, 15.5)]);
}

#[test]
fn test_configurable_budgets() {
    let modules = vec![Module::new("Math", 3.0, 15.5)];
    let codec = UrlCodec::with_limits(grade_share::CodecLimits {
        compressed_max_len: 5,
        base64_max_len: DEFAULT_BASE64_MAX_LEN,
    });

    let encoded = codec.encode_detailed(&modules).unwrap();
    assert_eq!(encoded.tier, "base64");
    assert_eq!(encoded.fragment, "data=WyJNYXRoIiwzLDE1LjVd");
}

/// xorshift64, deterministic so failures reproduce.
struct Xorshift(u64);

impl Xorshift {
    fn next_unit(&mut self) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn module(&mut self, index: usize) -> Module {
        let coefficient = 100.0 * (1.0 - self.next_unit());
        let average = 20.0 * self.next_unit();
        Module::new(format!("M{}", index), coefficient, average)
    }
}

fn codec_for_tier(tier: &str) -> UrlCodec {
    match tier {
        "compressed" => UrlCodec::new(),
        "base64" => UrlCodec::with_limits(grade_share::CodecLimits {
            compressed_max_len: 0,
            base64_max_len: usize::MAX,
        }),
        _ => UrlCodec::with_limits(grade_share::CodecLimits {
            compressed_max_len: 0,
            base64_max_len: 0,
        }),
    }
}

#[test]
fn test_full_precision_values_round_trip_in_every_tier() {
    let modules = vec![
        Module::new("Lab", 39.430133835633676, 13.123456789012345),
        Module::new("Thesis", 0.1 + 0.7, 19.999999999999996),
    ];

    for tier in ["compressed", "base64", "legacy"] {
        let codec = codec_for_tier(tier);
        let encoded = codec.encode_detailed(&modules).unwrap();
        assert_eq!(encoded.tier, tier);

        let decoded = codec.decode(&QueryParams::parse(&encoded.fragment)).unwrap();
        assert_eq!(decoded, modules, "tier {}", tier);
    }
}

#[test]
fn test_random_values_round_trip_in_every_tier() {
    for tier in ["compressed", "base64", "legacy"] {
        let codec = codec_for_tier(tier);
        let mut rng = Xorshift(0x9E37_79B9_7F4A_7C15);

        for round in 0..2000 {
            let modules: ModuleList = (0..1 + round % 3).map(|i| rng.module(i)).collect();
            let encoded = codec.encode_detailed(&modules).unwrap();
            assert_eq!(encoded.tier, tier);

            let decoded = codec.decode(&QueryParams::parse(&encoded.fragment));
            assert_eq!(decoded, Some(modules), "tier {} round {}", tier, round);
        }
    }
}
