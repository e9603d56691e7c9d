use std::fs;
use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;

const RECEIPT: &str = "\
AGRONORTE S.R.L.
FACTURA A Nro.: 0004-00012345
Fecha: 15/03/2024
Tipo de cambio: 950,50
ABCD1234 Fertilizer XYZ 10 U$S 5,00 U$S -0,50 U$S 47,50
IVA 21.00% U$S 10,00
Percepciones U$S 1,50
";

/// The binary with its configuration isolated from the user's.
fn recibo(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("recibo").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd.env("HOME", config_home);
    cmd
}

fn write_pdf(path: &Path, line: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(line)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let kids: Vec<Object> = vec![page_id.into()];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 1,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn latest_without_pdf_exits_with_nothing_to_do() {
    let home = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "hola").unwrap();

    recibo(home.path())
        .arg("latest")
        .arg(dir.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No PDF files found"));

    assert!(!dir.path().join("notes.json").exists());
}

#[test]
fn latest_writes_json_next_to_pdf() {
    let home = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("factura.pdf"), "AGRONORTE S.R.L.");

    recibo(home.path())
        .arg("latest")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Data exported to"));

    let json = fs::read_to_string(dir.path().join("factura.json")).unwrap();
    assert!(json.contains("\"archivo_pdf\": \"factura.pdf\""));
    assert!(json.contains("\"productos\": []"));
}

#[test]
fn latest_on_missing_directory_fails() {
    let home = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();

    recibo(home.path())
        .arg("latest")
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .code(predicate::ne(3));
}

#[test]
fn process_text_prints_json() {
    let home = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("compra.txt");
    fs::write(&input, RECEIPT).unwrap();

    recibo(home.path())
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"archivo_pdf\": \"compra.txt\""))
        .stdout(predicate::str::contains("\"proveedor\": \"AGRONORTE S.R.L.\""))
        .stdout(predicate::str::contains("\"tipo_cambio\": 950.5"))
        .stdout(predicate::str::contains("\"iva\": 9505.0"))
        .stdout(predicate::str::contains("\"percepciones\": 1425.75"))
        .stdout(predicate::str::contains("\"importe_pesos\": 45148.75"));
}

#[test]
fn process_reports_warnings_for_missing_fields() {
    let home = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("vacio.txt");
    fs::write(&input, "nada que ver\n").unwrap();

    recibo(home.path())
        .args(["process", "--show-warnings", "--validate"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fecha\""))
        .stderr(predicate::str::contains("tipo_cambio not found"))
        .stderr(predicate::str::contains("Validation issues:"));
}

#[test]
fn process_rejects_malformed_number() {
    let home = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("roto.txt");
    fs::write(&input, "IVA 21.00% U$S 1.2.3\n").unwrap();

    recibo(home.path())
        .arg("process")
        .arg(&input)
        .assert()
        .failure();
}

#[test]
fn batch_writes_outputs_and_summary() {
    let home = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::write(dir.path().join("a.txt"), RECEIPT).unwrap();
    fs::write(dir.path().join("b.txt"), "sin datos\n").unwrap();

    recibo(home.path())
        .arg("batch")
        .arg(dir.path().join("*.txt").to_str().unwrap())
        .arg("-o")
        .arg(&out)
        .args(["-j", "2", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,AGRONORTE S.R.L.,0004-00012345,15/03/2024"));
}

#[test]
fn config_set_and_get() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("recibo.json");

    recibo(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "output.indent", "2"])
        .assert()
        .success();

    recibo(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "output.indent"])
        .assert()
        .success()
        .stdout(predicate::str::diff("2\n"));

    recibo(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "output.unknown", "1"])
        .assert()
        .failure();
}

#[test]
fn process_uses_configured_indent() {
    let home = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = home.path().join("recibo.json");
    fs::write(&config, r#"{"output": {"indent": 2}}"#).unwrap();
    let input = dir.path().join("compra.txt");
    fs::write(&input, RECEIPT).unwrap();

    recibo(home.path())
        .arg("-c")
        .arg(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\n  \"archivo_pdf\""));
}
