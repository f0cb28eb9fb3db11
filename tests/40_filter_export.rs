mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

async fn seeded() -> Result<(common::TestServer, i64)> {
    let server = common::TestServer::spawn().await?;
    let class_id = server.create_class("6º Ano A", 25).await?;
    let ana = server.create_student("Ana Silva", Some("ana.silva@email.com"), "ativo").await?;
    server.create_student("Bruno Costa", Some("bruno.costa@email.com"), "ativo").await?;
    server.create_student("Carlos Santos", None, "inativo").await?;
    server.create_student("Diana Oliveira", Some("diana.oliveira@email.com"), "inativo").await?;
    server.enroll(ana, class_id).await?;
    Ok((server, class_id))
}

async fn names(server: &common::TestServer, query: &str) -> Result<Vec<String>> {
    let res = server.client.get(server.url(&format!("/alunos{}", query))).send().await?;
    assert_eq!(res.status(), StatusCode::OK, "query {}", query);
    let students = res.json::<Vec<Value>>().await?;
    Ok(students.iter().filter_map(|s| s["name"].as_str().map(str::to_string)).collect())
}

#[tokio::test]
async fn status_filter_accepts_portuguese_values() -> Result<()> {
    let (server, _) = seeded().await?;
    assert_eq!(names(&server, "?status=ativo").await?, vec!["Ana Silva", "Bruno Costa"]);
    assert_eq!(names(&server, "?status=inactive").await?, vec!["Carlos Santos", "Diana Oliveira"]);
    Ok(())
}

#[tokio::test]
async fn blank_parameters_do_not_filter() -> Result<()> {
    let (server, _) = seeded().await?;
    let everyone = vec!["Ana Silva", "Bruno Costa", "Carlos Santos", "Diana Oliveira"];
    assert_eq!(names(&server, "?status=").await?, everyone);
    assert_eq!(names(&server, "?search=&status=").await?, everyone);
    Ok(())
}

#[tokio::test]
async fn search_class_and_sort() -> Result<()> {
    let (server, class_id) = seeded().await?;
    assert_eq!(names(&server, "?search=SANTOS").await?, vec!["Carlos Santos"]);
    assert_eq!(names(&server, &format!("?turma_id={}", class_id)).await?, vec!["Ana Silva"]);
    assert_eq!(
        names(&server, "?sort=-name").await?,
        vec!["Diana Oliveira", "Carlos Santos", "Bruno Costa", "Ana Silva"]
    );
    // unknown sort keys fall back to id order
    assert_eq!(
        names(&server, "?sort=shoe_size").await?,
        vec!["Ana Silva", "Bruno Costa", "Carlos Santos", "Diana Oliveira"]
    );
    Ok(())
}

#[tokio::test]
async fn pagination_and_bad_parameters() -> Result<()> {
    let (server, _) = seeded().await?;
    assert_eq!(names(&server, "?limit=2&offset=1").await?, vec!["Bruno Costa", "Carlos Santos"]);

    for query in ["?limit=-1", "?offset=-3", "?status=suspenso", "?limit=abc"] {
        let res = server.client.get(server.url(&format!("/alunos{}", query))).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "query {}", query);
        assert_eq!(res.json::<Value>().await?["error"], "validation_error");
    }
    Ok(())
}

#[tokio::test]
async fn csv_and_json_exports_hold_the_same_rows() -> Result<()> {
    let (server, _) = seeded().await?;

    let res = server.client.get(server.url("/alunos/export?status=ativo")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/csv; charset=utf-8");
    assert_eq!(res.headers()["content-disposition"], "attachment; filename=\"alunos.csv\"");
    let csv = res.text().await?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "id,name,birth_date,email,status,class_id");
    assert_eq!(lines.len(), 3, "{}", csv);

    let res = server.client.get(server.url("/alunos/export?status=ativo&format=json")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["content-disposition"], "attachment; filename=\"alunos.json\"");
    let rows = res.json::<Vec<Value>>().await?;
    assert_eq!(rows.len(), lines.len() - 1);

    for (row, line) in rows.iter().zip(&lines[1..]) {
        let id = row["id"].as_i64().expect("id");
        assert!(line.starts_with(&format!("{},", id)), "{} vs {}", row, line);
    }
    assert!(rows[1]["class_id"].is_null());
    assert!(lines[2].ends_with(",active,"), "{}", lines[2]);
    Ok(())
}

#[tokio::test]
async fn export_rejects_unknown_format() -> Result<()> {
    let (server, _) = seeded().await?;
    let res = server.client.get(server.url("/alunos/export?format=xml")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert!(body["fields"]["format"].is_string(), "{}", body);
    Ok(())
}
