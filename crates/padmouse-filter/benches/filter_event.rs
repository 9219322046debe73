use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use padmouse_filter::{EventFilter, InputFilter};
use padmouse_input::codes::{ABS_X, ABS_Y, BTN_SOUTH};
use padmouse_input::{DeviceId, DeviceIdentity, RawEvent};
use padmouse_profile::ProfileTable;

const PAD: DeviceId = 1;

fn filter() -> InputFilter {
    let table = ProfileTable::builtin().unwrap().into_shared();
    let mut f = InputFilter::new(table);
    f.filter_new_device(
        10,
        PAD,
        "/dev/input/event1",
        DeviceIdentity::new("Xbox Wireless Controller", 0x045e, 0x0b12),
    );
    f.set_virtual_mouse_state(true).unwrap();
    f
}

pub fn bench_button_path(c: &mut Criterion) {
    let mut f = filter();
    let rx = f.mouse_events().unwrap();
    let press = RawEvent::key(BTN_SOUTH, 1);
    let release = RawEvent::key(BTN_SOUTH, 0);

    c.bench_function("filter_button_press_release", |b| {
        b.iter(|| {
            let a = f.filter_event(black_box(press), PAD);
            let r = f.filter_event(black_box(release), PAD);
            black_box(rx.try_iter().count());
            black_box((a, r))
        })
    });
}

pub fn bench_stick_path(c: &mut Criterion) {
    let mut f = filter();
    let rx = f.mouse_events().unwrap();
    let samples: Vec<RawEvent> = (0..64)
        .flat_map(|i| {
            let v = (i - 32) * 1024;
            [RawEvent::abs(ABS_X, v), RawEvent::abs(ABS_Y, -v)]
        })
        .collect();

    c.bench_function("filter_stick_sweep", |b| {
        b.iter(|| {
            let mut added = 0usize;
            for event in &samples {
                added += f.filter_event(black_box(*event), PAD).synthesized.len();
            }
            black_box(rx.try_iter().count());
            black_box(added)
        })
    });
}

pub fn bench_unknown_device(c: &mut Criterion) {
    let mut f = filter();
    let event = RawEvent::key(BTN_SOUTH, 1);

    c.bench_function("filter_unknown_device", |b| {
        b.iter(|| black_box(f.filter_event(black_box(event), 99)))
    });
}

criterion_group!(benches, bench_button_path, bench_stick_path, bench_unknown_device);
criterion_main!(benches);
