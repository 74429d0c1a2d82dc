use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn cronograma_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("cronograma");
    path
}

const HEADER: &str = "Semana,Dia,Tema do Dia,Aula,Link Aula,Link Gratuito\n";

fn write_config(root: &Path, port: u16) -> PathBuf {
    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[server]
bind = "127.0.0.1:{}"

[data]
root = "{}/planilhas"
"#,
        port,
        root.display()
    );

    let config_path = config_dir.join("cronograma.toml");
    fs::write(&config_path, config_content).unwrap();
    config_path
}

fn setup_test_env_with_port(port: u16) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let data_dir = root.join("planilhas");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(
        data_dir.join("clinica.csv"),
        format!(
            "{}{}{}{}",
            HEADER,
            "Semana 1 (15/09 a 21/09) Clínica Médica,15/09,Cardiologia - Hipertensão,Introdução,http://aula/1,\n",
            "Semana 1 (15/09 a 21/09) Clínica Médica,16/09,Nefrologia - IRA,Conceitos,http://aula/2,http://free/2\n",
            ",,,,,\n"
        ),
    )
    .unwrap();
    fs::write(
        data_dir.join("cirurgia.csv"),
        format!(
            "{}{}{}",
            HEADER,
            "Semana 2 (22/09 a 28/09) Cirurgia,22/09,Trauma - ATLS,Avaliação primária,,\n",
            "Semana 2 (22/09 a 28/09) Cirurgia,23/09,,Sem tema,,\n"
        ),
    )
    .unwrap();
    fs::write(data_dir.join("quebrado.xlsx"), "not a zip").unwrap();
    fs::write(data_dir.join("notas.txt"), "ignored").unwrap();

    let config_path = write_config(&root, port);
    (tmp, config_path)
}

fn setup_test_env() -> (TempDir, PathBuf) {
    setup_test_env_with_port(5999)
}

fn run_cronograma(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = cronograma_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run cronograma binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_build_summary() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_cronograma(&config_path, &["build"]);
    assert!(success, "build failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("files found: 3"), "stdout={}", stdout);
    assert!(stdout.contains("files read: 2"));
    assert!(stdout.contains("failed: quebrado.xlsx"));
    assert!(stdout.contains("rows read: 4"));
    assert!(stdout.contains("rows skipped: 1"));
    assert!(stdout.contains("weeks: 2"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_build_json() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_cronograma(&config_path, &["build", "--json"]);
    assert!(success, "build failed: {}", stderr);

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let weeks = json.as_object().unwrap();
    let keys: Vec<&String> = weeks.keys().collect();
    assert_eq!(keys, vec!["week_1", "week_2"]);

    let week = &json["week_1"];
    assert_eq!(week["numero"], 1);
    assert_eq!(week["periodo"], "15/09 a 21/09");
    assert_eq!(week["area_conhecimento"], "Clínica Médica");
    assert_eq!(week["dias"][0]["nome"], "15/09");
    assert_eq!(week["dias"][0]["temas"][0]["nome"], "Cardiologia");
    assert_eq!(week["dias"][0]["temas"][0]["subtemas"][0]["nome"], "Hipertensão");
    assert_eq!(
        week["dias"][0]["temas"][0]["subtemas"][0]["aulas"][0]["link_aula"],
        "http://aula/1"
    );
}

#[test]
fn test_search_table() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_cronograma(&config_path, &["search", "hipertensão"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("Introdução"));
    assert!(stdout.contains("1 result(s)"));
}

#[test]
fn test_search_json_is_case_insensitive() {
    let (_tmp, config_path) = setup_test_env();

    let (upper, _, ok1) = run_cronograma(&config_path, &["search", "CIRURGIA", "--json"]);
    let (lower, _, ok2) = run_cronograma(&config_path, &["search", "cirurgia", "--json"]);
    assert!(ok1 && ok2);
    assert_eq!(upper, lower);

    let json: serde_json::Value = serde_json::from_str(&lower).unwrap();
    let results = json["resultados"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["semana"], "week_2");
    assert_eq!(results[0]["aula_encontrada"], serde_json::json!([]));
}

#[test]
fn test_search_empty_term() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_cronograma(&config_path, &["search", ""]);
    assert!(!success);
    assert!(stderr.contains("must not be empty"), "stderr={}", stderr);

    let (stdout, stderr, success) = run_cronograma(&config_path, &["search", " "]);
    assert!(success, "whitespace term failed: {}", stderr);
    assert!(stdout.contains("result(s)"));
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_cronograma(&config_path, &["search", "dermatologia"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_sources() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_cronograma(&config_path, &["sources"]);
    assert!(success, "sources failed: {}", stderr);

    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("FILE"));
    // xlsx group first, then csv sorted by name
    assert!(lines[1].starts_with("quebrado.xlsx"));
    assert!(lines[1].contains("ERROR"));
    assert!(lines[2].starts_with("cirurgia.csv"));
    assert!(lines[3].starts_with("clinica.csv"));
    assert!(lines[3].contains("OK"));
    assert!(!stdout.contains("notas.txt"));
}

#[test]
fn test_sources_missing_root() {
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), 5999);

    let (_, stderr, success) = run_cronograma(&config_path, &["sources"]);
    assert!(!success);
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_invalid_config() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("bad.toml");
    fs::write(&config_path, "[server\nbind = ").unwrap();

    let (_, stderr, success) = run_cronograma(&config_path, &["build"]);
    assert!(!success);
    assert!(stderr.contains("Failed to parse config file"));
}

// ============ Server ============

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn start_server(config_path: &Path) -> std::process::Child {
    let binary = cronograma_binary();
    Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("serve")
        .env_remove("PORT")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to start server: {}", e))
}

fn wait_for_server(port: u16) {
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        std::thread::sleep(std::time::Duration::from_millis(100));
        if let Ok(resp) = reqwest::blocking::get(&url) {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

#[test]
fn test_server_health() {
    let port = find_free_port();
    let (_tmp, config_path) = setup_test_env_with_port(port);

    let mut server = start_server(&config_path);
    wait_for_server(port);

    let url = format!("http://127.0.0.1:{}/health", port);
    let resp = reqwest::blocking::get(&url).unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());

    server.kill().ok();
    server.wait().ok();
}

#[test]
fn test_server_schedule_and_search() {
    let port = find_free_port();
    let (_tmp, config_path) = setup_test_env_with_port(port);

    let mut server = start_server(&config_path);
    wait_for_server(port);

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::blocking::Client::new();

    let resp = client.get(format!("{}/api/cronograma", base)).send().unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["week_2"]["area_conhecimento"], "Cirurgia");

    let resp = client
        .get(format!("{}/api/buscar", base))
        .query(&[("q", "ATLS")])
        .send()
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().unwrap();
    let results = body["resultados"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["tema"], "Trauma");
    assert_eq!(results[0]["aula_encontrada"]["nome"], "Avaliação primária");

    server.kill().ok();
    server.wait().ok();
}

#[test]
fn test_server_search_requires_term() {
    let port = find_free_port();
    let (_tmp, config_path) = setup_test_env_with_port(port);

    let mut server = start_server(&config_path);
    wait_for_server(port);

    let client = reqwest::blocking::Client::new();
    for url in [
        format!("http://127.0.0.1:{}/api/buscar", port),
        format!("http://127.0.0.1:{}/api/buscar?q=", port),
    ] {
        let resp = client.get(&url).send().unwrap();
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = resp.json().unwrap();
        assert_eq!(body["error"], "Parâmetro de busca 'q' é obrigatório");
    }

    let resp = client
        .get(format!("http://127.0.0.1:{}/api/buscar?q=%20", port))
        .send()
        .unwrap();
    assert_eq!(resp.status(), 200);

    server.kill().ok();
    server.wait().ok();
}

#[test]
fn test_server_docs() {
    let port = find_free_port();
    let (_tmp, config_path) = setup_test_env_with_port(port);

    let mut server = start_server(&config_path);
    wait_for_server(port);

    let base = format!("http://127.0.0.1:{}", port);

    let resp = reqwest::blocking::get(format!("{}/static/swagger.json", base)).unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["openapi"], "3.0.0");
    assert!(body["paths"]["/api/buscar"].is_object());

    let resp = reqwest::blocking::get(format!("{}/api/docs", base)).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().unwrap().contains("swagger-ui"));

    let resp = reqwest::blocking::get(format!("{}/", base)).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().unwrap().contains("/api/cronograma"));

    server.kill().ok();
    server.wait().ok();
}

#[test]
fn test_server_port_env_override() {
    let configured = find_free_port();
    let port = find_free_port();
    let (_tmp, config_path) = setup_test_env_with_port(configured);

    let mut server = Command::new(cronograma_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("serve")
        .env("PORT", port.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    wait_for_server(port);

    server.kill().ok();
    server.wait().ok();
}
