use anyhow::Result;
use bytes::{Bytes, BytesMut};
use kestrel_protocol::codec::{decode_exact, Decodable, Encodable};
use kestrel_protocol::frame::{decode_frame, decode_frame_body, encode_frame, split_frame};
use kestrel_protocol::produce::*;
use kestrel_protocol::record::{Record, RecordBatch};
use kestrel_protocol::{ApiKey, KafkaArray, KafkaString, Request, Response, ResponseHeader};

fn sample_batch() -> RecordBatch {
    [("k1", "first"), ("k2", "second")].into_iter().collect()
}

#[test]
fn test_produce_request_roundtrip() -> Result<()> {
    let body = ProduceRequest::single("orders", 3, sample_batch(), RequiredAcks::All, 1500);
    let request = Request::new(2, 77, "billing", body)?;

    let mut buf = BytesMut::new();
    request.encode(&mut buf)?;
    assert_eq!(buf.len(), request.encoded_len());

    let decoded = decode_exact::<Request<ProduceRequest>>(&buf)?;
    assert_eq!(decoded.header.api_key, ApiKey::Produce);
    assert_eq!(decoded.header.api_version, 2);
    assert_eq!(decoded.header.client_id.as_str(), "billing");
    assert_eq!(decoded, request);

    let partition = &decoded.body.topics.0[0].partitions.0[0];
    assert_eq!(partition.partition, 3);
    assert_eq!(partition.records.len(), 2);
    assert_eq!(partition.records.elements()[1].record().value().as_bytes(), Some(&b"second"[..]));
    Ok(())
}

#[test]
fn test_produce_request_rejects_unsupported_version() {
    let body = ProduceRequest::single("orders", 0, sample_batch(), RequiredAcks::Leader, 100);
    assert!(Request::new(3, 1, "billing", body).is_err());
}

#[test]
fn test_produce_response_through_frame() -> Result<()> {
    let response = Response {
        header: ResponseHeader { correlation_id: 9 },
        body: ProduceResponse {
            topics: KafkaArray(vec![TopicProduceResponse {
                topic: KafkaString::from("orders"),
                partitions: vec![PartitionProduceResponse {
                    partition: 3,
                    error_code: 0,
                    base_offset: 1024,
                    log_append_time: Some(1_700_000_000_000),
                    log_start_offset: None,
                }],
            }]),
            throttle_time_ms: Some(0),
        },
    };

    // two frames arriving in one read, the second only partially
    let mut inbound = encode_frame(&response)?;
    let next = encode_frame(&response)?;
    inbound.extend_from_slice(&next[..5]);

    let body = split_frame(&mut inbound, 1 << 20)?.expect("first frame is complete");
    assert_eq!(inbound.len(), 5);

    let decoded = decode_frame_body(body, |buf| Response::<ProduceResponse>::decode(buf, 2))?;
    assert_eq!(decoded, response);
    assert!(decoded.body.topics.0[0].partitions[0].error().is_some_and(|e| e.is_ok()));

    assert!(split_frame(&mut inbound, 1 << 20)?.is_none());
    Ok(())
}

#[test]
fn test_record_survives_frame() -> Result<()> {
    let record = Record::new(Bytes::from_static(&[0, 1, 2]), "payload");
    let frame = encode_frame(&record)?.freeze();

    let decoded: Record = decode_frame(frame.slice(4..))?;
    assert_eq!(decoded, record);
    assert_eq!(decoded.crc(), record.crc());
    Ok(())
}

#[test]
fn test_decoding_does_not_overread() -> Result<()> {
    let mut buf = BytesMut::new();
    KafkaString::from("first").encode(&mut buf)?;
    KafkaString::from("second").encode(&mut buf)?;

    let mut read = buf.freeze();
    assert_eq!(KafkaString::decode(&mut read)?.as_str(), "first");
    assert_eq!(read.len(), 8);
    Ok(())
}
