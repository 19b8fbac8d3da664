//! BER encoding/decoding benchmarks.
//!
//! Covers the codec on the agent's hot path: one request decoded and one
//! response encoded per datagram.

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tiny_snmp::ber::{BerSink, Decoder, EncodeBuf, SliceBuf};
use tiny_snmp::message::{MAX_UDP_SNMP, Message};
use tiny_snmp::oid::Oid;
use tiny_snmp::pdu::Pdu;
use tiny_snmp::value::Value;
use tiny_snmp::varbind::VarBind;
use tiny_snmp::oid;

const SCENARIO_GET: [u8; 31] = [
    0x30, 0x19, 0x02, 0x01, 0x00, 0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', 0xA0, 0x0C,
    0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x01, 0x2B, 0x05,
    0x00,
];

/// Common OIDs used in benchmarks
fn common_oids() -> Vec<(&'static str, Oid)> {
    vec![
        ("short", oid!(1, 3)),
        ("sysDescr", oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)),
        ("ifIndex", oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 1)),
        (
            "high_arcs",
            oid!(1, 3, 6, 1, 4, 1, 200, 250, 128, 255, 1, 2, 3, 4, 5, 6),
        ),
    ]
}

fn bench_integer(c: &mut Criterion) {
    let mut group = c.benchmark_group("integer");

    let values = [
        ("zero", 0u32),
        ("boundary_127", 127),
        ("boundary_128", 128),
        ("max_i32", 0x7FFF_FFFF),
        ("max_u32", u32::MAX),
    ];

    for (name, value) in values {
        group.bench_with_input(BenchmarkId::new("encode", name), &value, |b, &v| {
            b.iter(|| {
                let mut out = [0u8; 8];
                let mut buf = SliceBuf::new(&mut out);
                buf.push_integer(black_box(v)).unwrap();
                black_box(buf.finish())
            })
        });

        let encoded = tiny_snmp::ber::encode_integer(value);
        group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, data| {
            b.iter(|| {
                let mut decoder = Decoder::new(data.clone());
                black_box(decoder.read_integer().unwrap())
            })
        });
    }

    group.finish();
}

fn bench_oid(c: &mut Criterion) {
    let mut group = c.benchmark_group("oid");

    for (name, oid) in common_oids() {
        group.bench_with_input(BenchmarkId::new("encode", name), &oid, |b, oid| {
            b.iter(|| black_box(tiny_snmp::ber::encode_oid(oid).unwrap()))
        });

        let encoded = tiny_snmp::ber::encode_oid(&oid).unwrap();
        group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, data| {
            b.iter(|| {
                let mut decoder = Decoder::new(data.clone());
                black_box(decoder.read_oid().unwrap())
            })
        });

        let text = oid.to_string();
        group.bench_with_input(BenchmarkId::new("parse", name), &text, |b, s| {
            b.iter(|| black_box(Oid::parse(s).unwrap()))
        });
    }

    group.finish();
}

fn bench_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("value");

    let values: Vec<(&str, Value)> = vec![
        ("integer", Value::Integer(42)),
        ("octet_string_short", Value::from("hello")),
        (
            "octet_string_max",
            Value::OctetString(Bytes::from(vec![0x41u8; 250])),
        ),
        ("null", Value::Null),
        ("oid", Value::ObjectIdentifier(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))),
    ];

    for (name, value) in &values {
        group.bench_with_input(BenchmarkId::new("encode", name), value, |b, value| {
            b.iter(|| {
                let mut buf = EncodeBuf::with_capacity(MAX_UDP_SNMP);
                value.encode(&mut buf).unwrap();
                black_box(buf.finish())
            })
        });

        let mut buf = EncodeBuf::new();
        value.encode(&mut buf).unwrap();
        let encoded = buf.finish();
        group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, data| {
            b.iter(|| {
                let mut decoder = Decoder::new(data.clone());
                black_box(Value::decode(&mut decoder).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("message");

    group.throughput(Throughput::Bytes(SCENARIO_GET.len() as u64));
    group.bench_function("decode_get_request", |b| {
        let data = Bytes::from_static(&SCENARIO_GET);
        b.iter(|| black_box(Message::decode(data.clone()).unwrap()))
    });

    let request = Message::decode_slice(&SCENARIO_GET).unwrap();
    let reply = request.reply(
        request
            .pdu
            .to_response_with(VarBind::new(oid!(1, 3), Value::Integer(42))),
    );

    group.bench_function("encode_response", |b| {
        b.iter(|| black_box(reply.encode().unwrap()))
    });

    group.bench_function("encode_response_into", |b| {
        let mut out = [0u8; MAX_UDP_SNMP];
        b.iter(|| black_box(reply.encode_into(&mut out).unwrap()))
    });

    // A response close to the datagram limit.
    let large = Message::v2c(
        "public",
        Pdu::response(
            0x7FFF_FFFF,
            VarBind::new(
                oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
                Value::OctetString(Bytes::from(vec![0x41u8; 240])),
            ),
        ),
    );
    let encoded = large.encode().unwrap();
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("decode_large_response", |b| {
        b.iter(|| black_box(Message::decode(encoded.clone()).unwrap()))
    });
    group.bench_function("encode_large_response_into", |b| {
        let mut out = [0u8; MAX_UDP_SNMP];
        b.iter(|| black_box(large.encode_into(&mut out).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_integer, bench_oid, bench_value, bench_message);
criterion_main!(benches);
