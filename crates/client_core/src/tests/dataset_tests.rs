use super::*;
use shared::vocab::{schema, LDP_CONTAINS};

#[test]
fn parses_expanded_container_listing() {
    let body = json!([
        {
            "@id": "https://pod.example/PASS/Documents/",
            "@type": ["http://www.w3.org/ns/ldp#BasicContainer"],
            "http://www.w3.org/ns/ldp#contains": [
                { "@id": "https://pod.example/PASS/Documents/Passport/" },
                { "@id": "https://pod.example/PASS/Documents/BankStatement/" }
            ]
        }
    ]);

    let dataset = SolidDataset::from_json_ld(&body).expect("dataset");
    let container = dataset
        .thing("https://pod.example/PASS/Documents/")
        .expect("container thing");
    assert!(container.has_type("http://www.w3.org/ns/ldp#BasicContainer"));
    assert_eq!(container.urls(LDP_CONTAINS).count(), 2);
}

#[test]
fn accepts_graph_objects_and_plain_literals() {
    let body = json!({
        "@context": {},
        "@graph": [
            { "@id": "https://pod.example/card#me", "http://xmlns.com/foaf/0.1/name": "Alice" },
            { "@id": "https://pod.example/card#me", "http://schema.org/identifier": { "@value": 7 } }
        ]
    });

    let dataset = SolidDataset::from_json_ld(&body).expect("dataset");
    assert_eq!(dataset.things().len(), 1);
    let me = &dataset.things()[0];
    assert_eq!(me.string("http://xmlns.com/foaf/0.1/name"), Some("Alice"));
    assert_eq!(me.string(schema::IDENTIFIER), Some("7"));
}

#[test]
fn rejects_non_object_nodes() {
    let err = SolidDataset::from_json_ld(&json!(["not a node"])).expect_err("should fail");
    assert!(matches!(err, ClientError::Dataset(_)));
}

#[test]
fn serialized_things_read_back_with_typed_literals() {
    let resource = url::Url::parse("https://pod.example/PASS/Users/userlist.ttl").expect("url");
    let uploaded = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
        .expect("timestamp")
        .with_timezone(&Utc);
    let expires = NaiveDate::from_ymd_opt(2030, 1, 31).expect("date");
    let thing = Thing::local(&resource, "alice")
        .add_type(schema::PERSON)
        .add_string(schema::GIVEN_NAME, "Alice")
        .add_url(schema::IDENTIFIER, "https://alice.pod.example/profile/card#me")
        .add_datetime(schema::DATE_MODIFIED, uploaded)
        .add_date(schema::END_DATE, expires);

    let mut dataset = SolidDataset::new();
    dataset.set_thing(thing);

    let written = dataset.to_json_ld();
    assert_eq!(written[0]["@type"][0], schema::PERSON);
    assert_eq!(written[0][schema::END_DATE][0]["@type"], XSD_DATE);

    let reread = SolidDataset::from_json_ld(&written).expect("reread");
    let alice = reread
        .thing("https://pod.example/PASS/Users/userlist.ttl#alice")
        .expect("alice");
    assert_eq!(alice.string(schema::GIVEN_NAME), Some("Alice"));
    assert_eq!(
        alice.get_url(schema::IDENTIFIER),
        Some("https://alice.pod.example/profile/card#me")
    );
    assert_eq!(alice.datetime(schema::DATE_MODIFIED), Some(uploaded));
    assert_eq!(alice.date(schema::END_DATE), Some(expires));
}

#[test]
fn set_thing_replaces_by_url_and_remove_reports_presence() {
    let mut dataset = SolidDataset::new();
    dataset.set_thing(Thing::new("https://pod.example/r#a").add_string(schema::NAME, "one"));
    dataset.set_thing(Thing::new("https://pod.example/r#a").add_string(schema::NAME, "two"));
    assert_eq!(dataset.things().len(), 1);
    assert_eq!(dataset.things()[0].string(schema::NAME), Some("two"));

    assert!(dataset.remove_thing("https://pod.example/r#a"));
    assert!(!dataset.remove_thing("https://pod.example/r#a"));
}
