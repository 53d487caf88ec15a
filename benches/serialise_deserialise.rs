use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::net::Ipv4Addr;
use std::str::FromStr;

use dns_proto::message::{Message, Question};
use dns_proto::name::Name;
use dns_proto::rr::{QueryClass, QueryType, RecordClass, RecordType, RecordTypeWithData, ResourceRecord};

fn domain(name: &str) -> Name {
    Name::from_str(name).unwrap()
}

fn a_record(name: &str, address: Ipv4Addr) -> ResourceRecord {
    ResourceRecord {
        name: domain(name),
        rtype_with_data: RecordTypeWithData::A { address },
        rclass: RecordClass::IN,
        ttl: 300,
    }
}

fn cname_record(name: &str, target_name: &str) -> ResourceRecord {
    ResourceRecord {
        name: domain(name),
        rtype_with_data: RecordTypeWithData::CNAME { cname: domain(target_name) },
        rclass: RecordClass::IN,
        ttl: 300,
    }
}

fn ns_record(superdomain_name: &str, nameserver_name: &str) -> ResourceRecord {
    ResourceRecord {
        name: domain(superdomain_name),
        rtype_with_data: RecordTypeWithData::NS { nsdname: domain(nameserver_name) },
        rclass: RecordClass::IN,
        ttl: 300,
    }
}

fn question_message() -> Message {
    Message::query(
        1234,
        Question {
            name: domain("www.example.com."),
            qtype: QueryType::Record(RecordType::A),
            qclass: QueryClass::Record(RecordClass::IN),
        },
    )
}

#[allow(non_snake_case)]
fn bench__question(c: &mut Criterion) {
    let message = question_message();

    c.bench_function("serialise/question", |b| {
        b.iter_batched(|| message.clone(), |message| message.to_octets(), BatchSize::SmallInput)
    });

    let serialised = message.to_octets();
    c.bench_function("deserialise/question", |b| b.iter(|| Message::from_octets(black_box(&serialised))));
}

#[allow(non_snake_case)]
fn bench__answer__small(c: &mut Criterion) {
    let mut message = question_message();
    message.header.is_response = true;
    message.answers = vec![a_record("www.example.com.", Ipv4Addr::new(1, 1, 1, 1))];

    c.bench_function("serialise/answer/small", |b| {
        b.iter_batched(|| message.clone(), |message| message.to_octets(), BatchSize::SmallInput)
    });

    let serialised = message.to_octets();
    c.bench_function("deserialise/answer/small", |b| b.iter(|| Message::from_octets(black_box(&serialised))));
}

#[allow(non_snake_case)]
fn bench__answer__big(c: &mut Criterion) {
    let mut message = question_message();
    message.header.is_response = true;

    let count = 128;

    for i in 0..count {
        message.answers.push(cname_record("www.example.com.", &format!("www.cname-target-{i}.example.com.")));
    }
    for i in 0..count {
        message.authority.push(ns_record(&format!("cname-target-{i}.example.com."), &format!("ns-{i}.example.com.")));
    }
    for i in 0..count {
        message.additional.push(a_record(&format!("ns-{i}.example.com."), Ipv4Addr::new(1, 1, 1, 1)));
    }

    c.bench_function("serialise/answer/big", |b| {
        b.iter_batched(|| message.clone(), |message| message.to_octets(), BatchSize::SmallInput)
    });

    let serialised = message.to_octets();
    c.bench_function("deserialise/answer/big", |b| b.iter(|| Message::from_octets(black_box(&serialised))));
}

criterion_group!(benches, bench__question, bench__answer__small, bench__answer__big);
criterion_main!(benches);
