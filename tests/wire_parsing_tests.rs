mod common;

use common::*;
use dnsclaim::wire::{
    Name, ParseError, Proof, RecordClass, RecordType, ResourceRecord, RrSet,
};

#[test]
fn proof_round_trips_through_the_submission_format() {
    let hierarchy = Hierarchy::new();
    let leaf = [txt_record("_ens.example.com", b"a=0x0000000000000000000000000000000000000001")];
    let mut builder = hierarchy.builder_through_zone();
    builder.push_signed(&leaf, &hierarchy.zone_zsk, INCEPTION, EXPIRATION);

    let proof = Proof::parse(builder.bytes()).unwrap();
    assert_eq!(proof.steps.len(), 6);
    assert_eq!(proof.steps[0].rrset.rtype, RecordType::Dnskey);
    assert_eq!(proof.steps[0].rrset.name, Name::root());
    assert_eq!(proof.steps[1].rrset.rtype, RecordType::Ds);
    assert_eq!(proof.steps[5].rrset.rtype, RecordType::Txt);
    assert_eq!(
        proof.steps[5].sig.signer_name,
        Name::parse("example.com").unwrap()
    );
}

#[test]
fn record_encoding_round_trips() {
    for record in [
        txt_record("example.com", b"hello world"),
        ds_record(&zone_key("example.com", 257, 9)),
        zone_key(".", 256, 10).record,
    ] {
        let mut wire = Vec::new();
        record.write(&mut wire);
        let mut pos = 0;
        let parsed = ResourceRecord::parse(&wire, &mut pos).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(pos, wire.len());
    }
}

#[test]
fn multi_record_rrsets_parse_as_one_step() {
    let hierarchy = Hierarchy::new();
    let records = [
        hierarchy.root_ksk.record.clone(),
        hierarchy.root_zsk.record.clone(),
    ];
    let sig = sign_rrset(&records, &hierarchy.root_ksk, INCEPTION, EXPIRATION);

    let mut builder = ProofBuilder::new();
    builder.push_step(&records, &sig);

    let proof = Proof::parse(builder.bytes()).unwrap();
    assert_eq!(proof.steps.len(), 1);
    assert_eq!(proof.steps[0].rrset.records().len(), 2);
}

#[test]
fn mixed_owner_names_in_one_step_rejected() {
    let a = txt_record("a.example.com", b"one");
    let b = txt_record("b.example.com", b"two");
    let sig = sign_rrset(
        &[a.clone()],
        &zone_key("example.com", 256, 11),
        INCEPTION,
        EXPIRATION,
    );

    let mut builder = ProofBuilder::new();
    builder.push_step(&[a, b], &sig);
    assert_eq!(Proof::parse(builder.bytes()).unwrap_err(), ParseError::MixedRrSet);
}

#[test]
fn signature_owner_must_match_the_rrset() {
    let record = txt_record("a.example.com", b"one");
    let sig = sign_rrset(
        &[txt_record("b.example.com", b"one")],
        &zone_key("example.com", 256, 12),
        INCEPTION,
        EXPIRATION,
    );

    let mut builder = ProofBuilder::new();
    builder.push_step(&[record], &sig);
    assert_eq!(Proof::parse(builder.bytes()).unwrap_err(), ParseError::MixedRrSet);
}

#[test]
fn compressed_names_rejected() {
    // a record whose owner name starts with a compression pointer
    let mut buf = Vec::new();
    let body: &[u8] = &[0xC0, 0x0C, 0, 16, 0, 1, 0, 0, 0, 0, 0, 0];
    buf.extend_from_slice(&(body.len() as u16).to_be_bytes());
    buf.extend_from_slice(body);
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.push(0x00); // placeholder sig chunk; record parsing fails first

    assert_eq!(Proof::parse(&buf).unwrap_err(), ParseError::CompressedName);
}

#[test]
fn oversized_label_rejected() {
    let mut body = vec![64u8];
    body.extend_from_slice(&[b'a'; 64]);
    body.push(0);
    body.extend_from_slice(&[0, 16, 0, 1, 0, 0, 0, 0, 0, 0]);

    let mut buf = Vec::new();
    buf.extend_from_slice(&(body.len() as u16).to_be_bytes());
    buf.extend_from_slice(&body);
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.push(0x00);

    assert_eq!(
        Proof::parse(&buf).unwrap_err(),
        ParseError::InvalidLabelLength(64)
    );
}

#[test]
fn rrset_with_zero_records_rejected() {
    let sig = sign_rrset(
        &[txt_record("example.com", b"x")],
        &zone_key("example.com", 256, 13),
        INCEPTION,
        EXPIRATION,
    );
    let mut sig_bytes = Vec::new();
    sig.write(&mut sig_bytes);

    let mut buf = Vec::new();
    buf.extend_from_slice(&0u16.to_be_bytes()); // empty rrset chunk
    buf.extend_from_slice(&(sig_bytes.len() as u16).to_be_bytes());
    buf.extend_from_slice(&sig_bytes);

    assert_eq!(Proof::parse(&buf).unwrap_err(), ParseError::EmptyRrSet);
}

#[test]
fn canonical_ordering_is_stable_between_signer_and_verifier() {
    // two TXT records packed in either order produce the same signed bytes
    let first = txt_record("example.com", b"alpha");
    let second = txt_record("example.com", b"beta");
    let key = zone_key("example.com", 256, 14);

    let sig_a = sign_rrset(
        &[first.clone(), second.clone()],
        &key,
        INCEPTION,
        EXPIRATION,
    );
    let sig_b = sign_rrset(&[second, first], &key, INCEPTION, EXPIRATION);
    assert_eq!(sig_a.rdata, sig_b.rdata);
}

#[test]
fn rrset_key_fields_come_from_the_records() {
    let record = txt_record("Example.COM", b"case");
    let set = RrSet::from_records(vec![record]).unwrap();
    // names canonicalize to lowercase at decode time
    assert_eq!(set.name, Name::parse("example.com").unwrap());
    assert_eq!(set.rtype, RecordType::Txt);
    assert_eq!(set.class, RecordClass::In);
}
