use oaslint::loader::load_document;
use oaslint::models::path::display_path;
use oaslint::{Finding, Linter, Severity, SpecFormat};
use std::path::Path;

fn lint_fixture(name: &str) -> Vec<Finding> {
    let linter = Linter::builtin().expect("bundled ruleset compiles");
    let document = load_document(Path::new("tests/fixtures").join(name))
        .unwrap_or_else(|e| panic!("failed to load {}: {}", name, e));
    linter.lint(&document)
}

fn with_code<'a>(findings: &'a [Finding], code: &str) -> Vec<&'a Finding> {
    findings.iter().filter(|f| f.code == code).collect()
}

fn paths_of(findings: &[&Finding]) -> Vec<String> {
    findings.iter().map(|f| display_path(&f.path)).collect()
}

#[test]
fn test_missing_tracking_id_header() {
    let findings = lint_fixture("tracking_id.yaml");

    let tracking = with_code(&findings, "tracking-id-header");
    assert_eq!(tracking.len(), 1);
    let finding = tracking[0];
    assert_eq!(finding.severity, Severity::Warn);
    assert_eq!(
        finding.path_strings(),
        vec!["paths", "/test", "get", "responses", "200"]
    );
    assert_eq!(finding.range.start.line, 10);
    assert_eq!(finding.range.start.character, 8);
    assert!(finding.message.contains("TrackingID"));

    assert!(with_code(&findings, "date-header-format").is_empty());
}

#[test]
fn test_put_declaring_200_and_204() {
    let findings = lint_fixture("put_exclusive.yaml");

    let exclusive = with_code(&findings, "put-200-xor-204");
    assert_eq!(exclusive.len(), 1);
    assert_eq!(exclusive[0].severity, Severity::Error);
    assert_eq!(exclusive[0].path_strings(), vec!["paths", "/things/{id}", "put"]);
    assert_eq!(exclusive[0].range.start.line, 6);
    assert_eq!(exclusive[0].range.start.character, 4);
}

#[test]
fn test_swagger_document() {
    let document = load_document("tests/fixtures/swagger_pets.yaml").unwrap();
    assert_eq!(document.format(), SpecFormat::Oas2);

    let findings = Linter::builtin().unwrap().lint(&document);

    assert_eq!(paths_of(&with_code(&findings, "semver-version")), vec!["info.version"]);
    assert_eq!(paths_of(&with_code(&findings, "base-path-version")), vec!["basePath"]);
    assert!(with_code(&findings, "server-url-version").is_empty());
    assert_eq!(paths_of(&with_code(&findings, "https-only-schemes")), vec!["schemes[0]"]);
    assert_eq!(
        paths_of(&with_code(&findings, "acceptable-auth-scheme")),
        vec!["securityDefinitions.basicAuth"]
    );
    assert_eq!(
        paths_of(&with_code(&findings, "date-fields")),
        vec!["definitions.Pet.properties.birthDate"]
    );
    assert_eq!(
        paths_of(&with_code(&findings, "plural-array-fields")),
        vec!["definitions.Pet.properties.tag"]
    );
}

#[test]
fn test_collection_pagination_tiers() {
    let findings = lint_fixture("swagger_pets.yaml");

    let likely = with_code(&findings, "collection-pagination");
    assert_eq!(paths_of(&likely), vec!["paths./pets.get.responses.200"]);
    assert!(likely[0].message.contains("`Link`"));

    let possible = with_code(&findings, "collection-pagination-offset");
    assert_eq!(possible.len(), 2);
    assert!(possible.iter().any(|f| f.message.contains("`offset`")));
    assert!(possible.iter().all(|f| f.severity == Severity::Hint));
}

#[test]
fn test_broken_sibling_reference() {
    let document = load_document("tests/fixtures/broken_refs.yaml").unwrap();
    assert_eq!(document.broken_refs(), ["#/components/schemas/Toy".to_string()]);

    let findings = Linter::builtin().unwrap().lint(&document);
    let broken = with_code(&findings, "broken-refs");
    assert_eq!(broken.len(), 1);
    assert_eq!(
        broken[0].path_strings(),
        vec!["components", "schemas", "Owner", "properties", "toy"]
    );
    assert_eq!(broken[0].range.start.line, 24);
    assert!(broken[0].message.contains("#/components/schemas/Toy"));

    // the rest of the ruleset still ran
    assert_eq!(with_code(&findings, "tracking-id-header").len(), 1);
}

#[test]
fn test_json_document_and_envelopes() {
    let findings = lint_fixture("errors.json");

    assert!(with_code(&findings, "error-message").is_empty());
    let identifier = with_code(&findings, "error-identifier");
    assert_eq!(paths_of(&identifier), vec!["paths./orders.post.responses.400"]);
    assert_eq!(identifier[0].range.start.line, 12);
}

#[test]
fn test_findings_follow_rule_order() {
    let linter = Linter::builtin().unwrap();
    let order: Vec<&str> = linter.rules().iter().map(|r| r.name.as_str()).collect();
    let findings = lint_fixture("swagger_pets.yaml");

    let positions: Vec<usize> = findings
        .iter()
        .map(|f| order.iter().position(|name| *name == f.code).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_field_name_casing_reads_only_field_names() {
    let findings = lint_fixture("job_schema.yaml");

    let casing = with_code(&findings, "field-name-casing");
    assert_eq!(
        paths_of(&casing),
        vec![
            "paths./jobs.parameters[0].name",
            "components.schemas.Job.properties.owner.properties.display_name",
            "paths./jobs.get.responses.404.content.application/json.schema.properties.error_code",
        ]
    );
    assert!(casing[0].message.contains("`page_size`"));
    assert_eq!(casing[1].range.start.line, 56);
    assert_eq!(casing[1].range.start.character, 12);

    // a property named `parameters` and sample payloads under `example(s)`
    assert!(casing.iter().all(|f| !f.message.contains("Free form")));
    assert!(casing.iter().all(|f| !f.message.contains("Snake_Key")));
    assert!(casing.iter().all(|f| !f.message.contains("Other_Key")));
}
