use std::time::{Duration, Instant};

use proptest::prelude::*;

use stripdeck::graphics::canvas::pixel_at;
use stripdeck::graphics::level_meter::CellColors;
use stripdeck::graphics::{LevelMeter, LevelMeterConfig, PeakHold};

/// One channel, 19 cells at x = 1, 3, 5, ...
fn mono_meter() -> LevelMeter {
    let mut cfg = LevelMeterConfig { channel_count: 1, ..Default::default() };
    cfg.image.width = 40;
    cfg.image.height = 3;
    LevelMeter::with_config(cfg)
}

fn lit_cells(level: f64) -> usize {
    let mut meter = mono_meter();
    let geo = meter.geometry().unwrap();
    let pm = meter.render_horizontal(&[level]).unwrap();
    let c = CellColors::default();
    (0..geo.cell_count as u32)
        .filter(|i| {
            let p = pixel_at(&pm, 1 + i * 2, 1);
            p == Some(c.normal) || p == Some(c.good) || p == Some(c.clipped)
        })
        .count()
}

proptest! {
    #[test]
    fn louder_never_lights_fewer_cells(a in -100.0f64..12.0, b in -100.0f64..12.0) {
        let (quiet, loud) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(lit_cells(quiet) <= lit_cells(loud));
    }

    #[test]
    fn rising_input_never_lowers_the_peak(
        start in -150.0f64..0.0,
        steps in prop::collection::vec((0.01f64..5.0, 0u64..2000), 1..32),
        mode in prop_oneof![
            Just(PeakHold::None),
            Just(PeakHold::ShowPeak),
            Just(PeakHold::FillPeak),
            Just(PeakHold::FillPeakShowCurrent),
        ],
    ) {
        let mut meter = mono_meter();
        meter.config.peak_hold = mode;
        let mut now = Instant::now();
        let mut level = start;
        meter.render_horizontal_at(&[level], now).unwrap();
        let mut last = meter.peaks()[0];

        for (rise, millis) in steps {
            level += rise;
            now += Duration::from_millis(millis);
            meter.render_horizontal_at(&[level], now).unwrap();
            let peak = meter.peaks()[0];
            prop_assert!(peak >= last, "peak fell from {} to {}", last, peak);
            last = peak;
        }
    }
}
