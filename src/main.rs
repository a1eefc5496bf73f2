use binrec::prelude::*;

fn check(format: &str, value: Value) {
    let registry = Registry::new();
    let mut sink: Vec<u8> = Vec::new();
    let written = registry.encode(format, &value, &mut sink).unwrap();
    assert_eq!(written, sink.len());

    let mut source: ByteParser = sink.try_into_parser().unwrap();
    let decoded = registry.decode_repeat(format, &mut source).unwrap();
    println!("{format}: {value:?} -> {written} bytes -> {decoded:?}");
}

fn main() {
    check("i", Value::Int(-7));
    check("[s]", vals!["round trip"]);
    check("bf", vals![1i8, 1.0f32, 2i8, 2.0f32]);
    check("[d]", Value::Seq(vec![vals![1.0f64, 2.0, 3.0]]));
}
