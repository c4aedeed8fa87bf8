// tests/attributes_roundtrip.rs
//
// Случайные карты атрибутов (ASCII, Latin-1, BMP, астральные и управляющие
// кодпоинты, неизвестные ключи) проходят через запись заголовка и чтение.
// Проверяем равенство карт с учётом атрибутов, которые дописывает fill-in.

use anyhow::Result;
use oorandom::Rand64;

use dicthdr::consts::MAX_HEADER_BYTES_DEFAULT;
use dicthdr::{AttrKey, AttributeMap, CodePoints, ExtendableBuffer, FixedClock, HeaderPolicy};

fn random_code_point(rng: &mut Rand64) -> u32 {
    match rng.rand_range(0..5) {
        0 => rng.rand_range(0x20..0x7F) as u32,
        1 => rng.rand_range(0x80..0x100) as u32,
        2 => rng.rand_range(0x100..0xD800) as u32,
        3 => rng.rand_range(0x1_0000..0x11_0000) as u32,
        _ => rng.rand_range(0..0x20) as u32,
    }
}

fn random_string(rng: &mut Rand64, max_len: u64) -> CodePoints {
    let len = rng.rand_range(0..max_len + 1);
    (0..len).map(|_| random_code_point(rng)).collect()
}

#[test]
fn random_attribute_maps_survive_write_and_decode() -> Result<()> {
    let mut rng = Rand64::new(0x5EED_D1C7);
    for iter in 0..200 {
        let mut attrs = AttributeMap::new();
        let n = rng.rand_range(0..12);
        for _ in 0..n {
            let key = random_string(&mut rng, 24);
            let value = random_string(&mut rng, 48);
            attrs.insert_raw(key, value);
        }
        if rng.rand_range(0..2) == 0 {
            attrs.set_str(AttrKey::Locale, "pt_BR");
        }

        let version = rng.rand_range(0..u16::MAX as u64 + 1) as u16;
        let flags = rng.rand_range(0..u16::MAX as u64 + 1) as u16;
        let policy = HeaderPolicy::new(version, flags, attrs.clone());

        let clock = FixedClock::new(rng.rand_range(0..i32::MAX as u64) as i32);
        let unigrams = rng.rand_range(0..1_000_000) as i32;
        let decayed = rng.rand_range(0..2) == 1;

        let mut out = ExtendableBuffer::new(MAX_HEADER_BYTES_DEFAULT);
        policy.fill_in_and_write_header(&clock, decayed, unigrams, 0, 0, &mut out)?;

        let expected = policy.fill_in_header(&clock, decayed, unigrams, 0, 0);
        let reopened = HeaderPolicy::from_dict_buf(out.as_slice())?;
        assert_eq!(reopened.attributes(), &expected, "iteration {}", iter);
        assert_eq!(reopened.format_version(), version);
        assert_eq!(reopened.flags(), flags);
        assert_eq!(reopened.size(), out.tail_position());

        // Всё, что не трогает fill-in, переживает запись без изменений.
        for (k, v) in attrs.iter() {
            let touched = AttrKey::ALL
                .iter()
                .any(|key| key.as_str().chars().map(|c| c as u32).eq(k.iter().copied()));
            if !touched {
                assert_eq!(reopened.attributes().get_raw(k), Some(v));
            }
        }
    }
    Ok(())
}
