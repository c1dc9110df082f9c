//! Properties of the TZX parser and the TAPE pulse generator on generated tape images.
use core::num::NonZeroU32;
use rand::prelude::*;
use rand::rngs::SmallRng;
use spectrusty_tzx::pulse::{standard_block_pulses, standard_block_pulse_count, consts::*};
use spectrusty_tzx::tzx::*;

fn random_block<R: Rng>(rng: &mut R) -> TzxBlock {
    if rng.gen_bool(0.3) {
        let mut text = vec![0u8; rng.gen_range(0..=255)];
        rng.fill(&mut text[..]);
        TextDescription::new(text).into()
    }
    else {
        let mut data = vec![0u8; rng.gen_range(0..=600)];
        rng.fill(&mut data[..]);
        let pause = if rng.gen_bool(0.5) { 0 } else { rng.gen() };
        StandardSpeedBlock::new(data).with_pause(pause).into()
    }
}

fn random_tzx<R: Rng>(rng: &mut R, nblocks: usize) -> TzxFile {
    let mut tzx = TzxFile::new();
    tzx.major_revision = rng.gen();
    tzx.minor_revision = rng.gen();
    tzx.blocks = (0..nblocks).map(|_| random_block(rng)).collect();
    tzx
}

fn manual_image(tzx: &TzxFile) -> Vec<u8> {
    let mut image = b"ZXTape!\x1a".to_vec();
    image.push(tzx.major_revision);
    image.push(tzx.minor_revision);
    for block in tzx.blocks.iter() {
        match block {
            TzxBlock::StandardSpeed(block) => {
                image.push(0x10);
                image.extend_from_slice(&block.pause_after_block_in_ms.to_le_bytes());
                image.extend_from_slice(&(block.data.len() as u16).to_le_bytes());
                image.extend_from_slice(&block.data);
            }
            TzxBlock::Text(text) => {
                image.push(0x30);
                image.push(text.text.len() as u8);
                image.extend_from_slice(&text.text);
            }
        }
    }
    image
}

#[test]
fn test_parse_preserves_blocks() {
    let mut rng = SmallRng::seed_from_u64(0x5A5A_1010);
    for nblocks in 0..20 {
        let tzx = random_tzx(&mut rng, nblocks);
        let image = manual_image(&tzx);
        let parsed = parse_tzx(&image).unwrap();
        assert_eq!(nblocks, parsed.blocks.len());
        assert_eq!(tzx, parsed);
        assert_eq!(image, parsed.to_vec().unwrap());
    }
}

#[test]
fn test_signature_rejected() {
    let mut rng = SmallRng::seed_from_u64(8);
    let image = manual_image(&random_tzx(&mut rng, 3));
    for _ in 0..100 {
        let mut bad = image.clone();
        let index = rng.gen_range(0..8);
        bad[index] ^= rng.gen_range(1..=255u8);
        match parse_tzx(&bad) {
            Err(FormatError::Signature { found }) => assert_eq!(&bad[..8], &found[..]),
            res => panic!("unexpected result: {:?}", res)
        }
    }
}

#[test]
fn test_unknown_block_rejected() {
    let image = b"ZXTape!\x1a\x01\x14\x99";
    let err = parse_tzx(image).unwrap_err();
    assert_eq!(FormatError::UnsupportedBlock { id: 0x99, offset: 10 }, err);
    assert!(err.to_string().contains("0x99"));

    for id in (0u8..=255).filter(|&id| id != 0x10 && id != 0x30) {
        let mut image = b"ZXTape!\x1a\x01\x14\x30\x00".to_vec();
        image.push(id);
        image.extend_from_slice(&[0; 8]);
        assert_eq!(Err(FormatError::UnsupportedBlock { id, offset: 12 }), parse_tzx(&image));
    }
}

#[test]
fn test_truncation_rejected() {
    let mut image = b"ZXTape!\x1a\x01\x14\x10\xe8\x03\x64\x00".to_vec();
    image.extend_from_slice(&[1, 2, 3, 4, 5]);
    match parse_tzx(&image) {
        Err(FormatError::Truncated { offset: 15, field: "data", available: 5 }) => {}
        res => panic!("unexpected result: {:?}", res)
    }
    let mut rng = SmallRng::seed_from_u64(77);
    let full = manual_image(&random_tzx(&mut rng, 6));
    for len in 10..full.len() {
        let res = parse_tzx(&full[..len]);
        // cuts at block boundaries parse fine
        if let Err(err) = res {
            assert!(matches!(err, FormatError::Truncated {..}), "{}", err);
            assert!(err.offset() <= len);
        }
    }
}

#[test]
fn test_pause_zero_identity() {
    let data = [0x00, 0x03, 0x52, 0x4f, 0x4d];
    let tzx = TzxFile::new().with_block(StandardSpeedBlock::new(&data[..]).with_pause(0));
    let pulses: Vec<_> = pulses(&tzx).collect();
    assert_eq!(standard_block_pulses(&data).count(), pulses.len());
    let last = pulses.last().unwrap().duration;
    assert!(last == ZERO_PULSE_LENGTH || last == ONE_PULSE_LENGTH);
}

#[test]
fn test_pause_nonzero_addition() {
    let data = [0x00, 0x03, 0x52, 0x4f, 0x4d];
    let tzx = TzxFile::new().with_block(StandardSpeedBlock::new(&data[..]).with_pause(1000));
    let pulses: Vec<_> = pulses(&tzx).collect();
    assert_eq!(standard_block_pulses(&data).count() + 1, pulses.len());
    let (pause, rest) = pulses.split_last().unwrap();
    assert_eq!(NonZeroU32::new(3_500_000).unwrap(), pause.duration);
    assert_eq!(!rest.last().unwrap().level, pause.level);
}

#[test]
fn test_level_continuity() {
    let mut rng = SmallRng::seed_from_u64(2020);
    for _ in 0..10 {
        let tzx = random_tzx(&mut rng, 8);
        let mut level = false;
        let mut expected = Vec::new();
        for block in tzx.data_blocks() {
            for duration in block.pulse_iter() {
                expected.push(Pulse { level, duration });
                level = !level;
            }
            if let Some(duration) = block.pause_pulse() {
                expected.push(Pulse { level, duration });
            }
        }
        let iter = tzx.pulse_iter();
        assert_eq!(expected.len(), iter.len());
        assert_eq!(expected, iter.collect::<Vec<_>>());
        let total: usize = tzx.data_blocks()
            .map(|b| standard_block_pulse_count(&b.data) + b.pause_pulse().is_some() as usize)
            .sum();
        assert_eq!(total, expected.len());
    }
}

#[test]
fn test_second_block_lead_follows_pause_level() {
    let tzx = TzxFile::new()
                .with_block(StandardSpeedBlock::new(vec![0x00]).with_pause(1000))
                .with_block(StandardSpeedBlock::new(vec![0xFF, 0x00]).with_pause(1000));
    let pulses: Vec<_> = tzx.pulse_iter().collect();
    let first = standard_block_pulse_count(&[0x00]);
    let pause = pulses[first];
    assert_eq!(NonZeroU32::new(3_500_000).unwrap(), pause.duration);
    let lead = pulses[first + 1];
    assert_eq!(LEAD_PULSE_LENGTH, lead.duration);
    assert_eq!(pause.level, lead.level);
    assert_eq!(true, lead.level);
}

#[test]
fn test_read_tzx_from_reader() {
    let mut rng = SmallRng::seed_from_u64(1);
    let tzx = random_tzx(&mut rng, 4);
    let mut image = Vec::new();
    write_tzx(&mut image, &tzx).unwrap();
    assert_eq!(tzx, read_tzx(&image[..]).unwrap());
    image[0] = b'P';
    let err = read_tzx(&image[..]).unwrap_err();
    assert!(err.is_tzx_format());
    assert!(matches!(err.tzx_format_ref(), Some(FormatError::Signature {..})));
}

#[cfg(feature = "snapshot")]
#[test]
fn test_snapshot_serde() {
    let mut rng = SmallRng::seed_from_u64(3);
    let tzx = random_tzx(&mut rng, 5);
    let json = serde_json::to_string(&tzx).unwrap();
    let restored: TzxFile = serde_json::from_str(&json).unwrap();
    assert_eq!(tzx, restored);

    let data = [0xFFu8, 0x12, 0x34];
    let mut iter = standard_block_pulses(&data);
    for _ in iter.by_ref().take(LEAD_PULSES_DATA as usize + 5) {}
    let state: spectrusty_tzx::pulse::PulseIterState =
        serde_json::from_str(&serde_json::to_string(iter.state()).unwrap()).unwrap();
    assert_eq!(*iter.state(), state);
}
