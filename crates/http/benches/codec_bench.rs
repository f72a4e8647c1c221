use std::hint::black_box;

use bytes::{Bytes, BytesMut};
use criterion::{criterion_group, criterion_main, Criterion};
use http::StatusCode;
use tokio_util::codec::{Decoder, Encoder};

use mono_http::codec::{RequestDecoder, ResponseEncoder};
use mono_http::protocol::{BodyChunk, Frame, Framing, Response};

fn bench_request_decoder(c: &mut Criterion) {
    let simple = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";

    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(&simple[..]);
            while let Some(frame) = decoder.decode(&mut bytes).unwrap() {
                black_box(&frame);
            }
        });
    });

    let with_body = b"POST /submit HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: 16\r\n\r\n{\"key\": \"value\"}";

    c.bench_function("decode_request_with_body", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(&with_body[..]);
            while let Some(frame) = decoder.decode(&mut bytes).unwrap() {
                black_box(&frame);
            }
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let head = Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "text/plain")
                .header("Content-Length", "12")
                .build()
                .unwrap()
                .into_parts()
                .0;

            let mut encoder = ResponseEncoder::new();
            let mut dst = BytesMut::new();
            encoder.encode(Frame::Head((head, Framing::Length(12))), &mut dst).unwrap();
            encoder.encode(Frame::Body(BodyChunk::Data(Bytes::from_static(b"Hello World!"))), &mut dst).unwrap();
            encoder.encode(Frame::Body(BodyChunk::End), &mut dst).unwrap();
            black_box(&dst);
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_response_encoder);
criterion_main!(benches);
