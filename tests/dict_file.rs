use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dicthdr::consts::MAX_VALUE_FOR_WEIGHTING;
use dicthdr::{
    create_dict_file, read_header_file, rewrite_header, write_dict_file, AttrKey, AttributeMap,
    ExtendableBuffer, FixedClock, HeaderConfig, HeaderPolicy,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("dhtest-{prefix}-{pid}-{t}-{id}"))
}

#[test]
fn malformed_values_do_not_block_open() -> Result<()> {
    let root = unique_root("malformed");
    fs::create_dir_all(&root)?;
    let path = root.join("user.dict");
    let cfg = HeaderConfig::default();

    let mut attrs = AttributeMap::new();
    attrs.set_str(AttrKey::UnigramCount, "lots");
    attrs.set_str(AttrKey::MultipleWordsDemotionRate, "-1");
    attrs.set_str(AttrKey::IsDecayingDict, "TRUE");
    attrs.set_str(AttrKey::Locale, "en_US");
    let policy = HeaderPolicy::new(cfg.format_version, 0, attrs);
    assert_eq!(policy.unigram_count(), 0, "malformed count falls back to default");
    assert_eq!(policy.multi_word_cost_multiplier(), MAX_VALUE_FOR_WEIGHTING);
    assert!(!policy.is_decaying_dict());

    create_dict_file(&path, &policy, &FixedClock::new(20), &cfg)?;
    let (p, body) = read_header_file(&path)?;
    assert!(body.is_empty());
    assert_eq!(p.header_value_or_question_mark("locale"), "en_US");
    assert_eq!(p.header_value_or_question_mark("USES_FORGETTING_CURVE"), "TRUE");
    assert_eq!(p.multi_word_cost_multiplier(), MAX_VALUE_FOR_WEIGHTING);
    assert!(!p.is_decaying_dict());
    Ok(())
}

#[test]
fn unknown_keys_survive_rewrite() -> Result<()> {
    let root = unique_root("unknown");
    fs::create_dir_all(&root)?;
    let path = root.join("main.dict");
    let cfg = HeaderConfig::default().with_fixed_time(Some(1234));

    let mut attrs = AttributeMap::new();
    attrs.set_str(AttrKey::Locale, "sv");
    attrs.set_str("dictionary", "main:sv");
    attrs.set_str("X_VENDOR_TAG", "\u{1F600}");
    let policy = HeaderPolicy::new(cfg.format_version, 0x0002, attrs);
    let clock = cfg.clock();
    create_dict_file(&path, &policy, &*clock, &cfg)?;

    let (p, _) = read_header_file(&path)?;
    let body = vec![0xA5u8; 64];
    rewrite_header(&path, &p, &body, &*clock, true, &cfg)?;

    let (p2, body2) = read_header_file(&path)?;
    assert_eq!(body2, body);
    assert_eq!(p2.flags(), 0x0002);
    assert_eq!(p2.header_value_or_question_mark("dictionary"), "main:sv");
    assert_eq!(p2.header_value_or_question_mark("X_VENDOR_TAG"), "\u{1F600}");
    assert_eq!(p2.last_decayed_time(), 1234);
    Ok(())
}

#[test]
fn truncated_file_is_rejected() -> Result<()> {
    let root = unique_root("truncated");
    fs::create_dir_all(&root)?;
    let path = root.join("broken.dict");

    let mut attrs = AttributeMap::new();
    attrs.set_str(AttrKey::Locale, "it");
    let mut out = ExtendableBuffer::new(1024);
    let policy = HeaderPolicy::new(4, 0, attrs);
    policy.fill_in_and_write_header(&FixedClock::new(1), false, 0, 0, 0, &mut out)?;
    let bytes = out.into_inner();
    write_dict_file(&path, &bytes[..bytes.len() - 3], &[])?;

    let err = read_header_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("exceeds"), "got: {:#}", err);
    Ok(())
}

#[test]
fn create_keeps_counts_from_policy() -> Result<()> {
    let root = unique_root("create-counts");
    fs::create_dir_all(&root)?;
    let path = root.join("main.dict");
    let cfg = HeaderConfig::default();

    let mut attrs = AttributeMap::new();
    attrs.set_str(AttrKey::Locale, "en_US");
    attrs.set_int(AttrKey::UnigramCount, 500);
    attrs.set_int(AttrKey::BigramCount, 200);
    attrs.set_int(AttrKey::ExtendedRegionSize, 64);
    let policy = HeaderPolicy::new(cfg.format_version, 0, attrs);
    create_dict_file(&path, &policy, &FixedClock::new(10), &cfg)?;

    let (p, body) = read_header_file(&path)?;
    assert!(body.is_empty());
    assert_eq!(p.unigram_count(), 500);
    assert_eq!(p.bigram_count(), 200);
    assert_eq!(p.extended_region_size(), 64);
    assert_eq!(p.header_value_or_question_mark("UNIGRAM_COUNT"), "500");
    Ok(())
}
