use criterion::{black_box, criterion_group, criterion_main, Criterion};

use binrec::{ByteParser, Registry, TryIntoParser, Value};

#[derive(Debug, Clone)]
struct Frame {
    seq: i8,
    lane: i8,
    samples: Vec<f64>,
    gain: f64,
    label: String,
    offset: f64,
}

fn frame_registry() -> Registry {
    let mut reg = Registry::new();
    reg.register(
        'R',
        "bb[f]f[s]d",
        |fields| {
            let mut it = fields.into_iter();
            Box::new(Frame {
                seq: it.next().unwrap().as_int().unwrap() as i8,
                lane: it.next().unwrap().as_int().unwrap() as i8,
                samples: it
                    .next()
                    .unwrap()
                    .into_seq()
                    .unwrap()
                    .iter()
                    .map(|v| v.as_float().unwrap())
                    .collect(),
                gain: it.next().unwrap().as_float().unwrap(),
                label: it.next().unwrap().into_string().unwrap(),
                offset: it.next().unwrap().as_float().unwrap(),
            })
        },
        |rec| {
            let f = rec.downcast_ref::<Frame>()?;
            Some(vec![
                Value::Int(f.seq as i64),
                Value::Int(f.lane as i64),
                Value::Seq(f.samples.iter().map(|&x| Value::Float(x)).collect()),
                Value::Float(f.gain),
                Value::Str(f.label.clone()),
                Value::Float(f.offset),
            ])
        },
    )
    .unwrap();
    reg
}

fn frame_stream(count: usize) -> Value {
    let frame = Frame {
        seq: 1,
        lane: 2,
        samples: (1..=9).map(f64::from).collect(),
        gain: 3.0,
        label: "Hallo Welt".to_owned(),
        offset: 4.0,
    };
    Value::Seq(
        std::iter::repeat_with(|| Value::record(frame.clone()))
            .take(count)
            .collect(),
    )
}

fn encode_speed_bench(c: &mut Criterion) {
    let reg = frame_registry();
    let stream = frame_stream(1000);

    c.bench_function("encode_1000_frames", |b| {
        b.iter(|| {
            let mut sink: Vec<u8> = Vec::new();
            black_box(reg.encode("R", &stream, &mut sink).unwrap())
        })
    });
}

fn decode_speed_bench(c: &mut Criterion) {
    let reg = frame_registry();
    let stream = frame_stream(1000);
    let mut buf: Vec<u8> = Vec::new();
    reg.encode("R", &stream, &mut buf).unwrap();

    c.bench_function("decode_1000_frames", |b| {
        b.iter(|| {
            let mut source: ByteParser = buf.clone().try_into_parser().unwrap();
            black_box(reg.decode_repeat("R", &mut source).unwrap())
        })
    });
}

criterion_group!(benches, encode_speed_bench, decode_speed_bench);
criterion_main!(benches);
