use stratus_core::{
    parse_manifest_str, validate_cluster, validate_platform, Cluster, DocumentFormat, ParseError,
    Platform, Region, Validate,
};

fn demo_platform() -> Platform {
    Platform {
        name: "demo".to_string(),
        domain: "demo.example.com".to_string(),
        gslb: "route53".to_string(),
        kv: "consul".to_string(),
        regions: vec![Region {
            provider: "aws".to_string(),
            region: "us-east-1".to_string(),
            control: vec![],
            resource: vec![],
            network: vec![],
        }],
    }
}

#[test]
fn parses_yaml_manifest() {
    let doc = r#"
platforms:
  - name: demo
    domain: demo.example.com
    gslb: route53
    kv: consul
    regions:
      - provider: aws
        region: us-east-1
      - provider: azure
        region: uksouth
        control: [m3o]
"#;

    let parsed = parse_manifest_str(doc, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Yaml);

    let platform = &parsed.manifest.platforms[0];
    assert_eq!(platform.name, "demo");
    assert_eq!(platform.kv, "consul");
    assert_eq!(platform.regions.len(), 2);
    assert_eq!(platform.regions[1].provider, "azure");
    assert_eq!(platform.regions[1].control, vec!["m3o".to_string()]);
    assert!(platform.regions[1].resource.is_empty());
}

#[test]
fn parses_json_manifest_with_auto_detection() {
    let doc = r#"{
  "platforms": [
    { "name": "demo", "kv": "consul", "regions": [] }
  ]
}"#;

    let parsed = parse_manifest_str(doc, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Json);
    assert!(parsed.manifest.platforms[0].regions.is_empty());
}

#[test]
fn rejects_manifest_missing_required_fields() {
    let doc = r#"
platforms:
  - domain: demo.example.com
"#;

    assert!(parse_manifest_str(doc, DocumentFormat::Yaml).is_err());
}

#[test]
fn auto_detection_reports_the_underlying_parser_error() {
    let err = parse_manifest_str("platforms: [", DocumentFormat::Auto).unwrap_err();
    assert!(matches!(err, ParseError::Yaml(_)), "{err}");

    let err = parse_manifest_str("{ \"platforms\": ", DocumentFormat::Auto).unwrap_err();
    assert!(matches!(err, ParseError::Json(_)), "{err}");
}

#[test]
fn valid_platform_passes_validation() {
    assert!(validate_platform(&demo_platform()).is_ok());
}

#[test]
fn empty_name_is_a_violation() {
    let mut platform = demo_platform();
    platform.name = String::new();

    let err = validate_platform(&platform).unwrap_err();
    assert_eq!(err.violations.len(), 1);
    assert_eq!(err.violations[0].path, "platform.name");
}

#[test]
fn path_unsafe_identifiers_are_violations() {
    let mut platform = demo_platform();
    platform.kv = "consul/v2".to_string();
    platform.regions[0].region = "us east 1".to_string();

    let err = platform.validate().unwrap_err();
    let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["platform.kv", "platform.regions[0].region"]);
    assert!(err.to_string().contains("2 violations"));
}

#[test]
fn cluster_requires_all_fields() {
    let cluster = Cluster {
        name: "edge".to_string(),
        region: "uksouth".to_string(),
        provider: String::new(),
    };

    let err = validate_cluster(&cluster).unwrap_err();
    assert_eq!(err.violations[0].path, "cluster.provider");
}
