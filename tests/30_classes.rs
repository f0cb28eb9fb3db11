mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn classes_report_occupancy() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let class_id = server.create_class("6º Ano A", 25).await?;
    let student_id = server.create_student("Ana Silva", None, "ativo").await?;
    assert_eq!(server.enroll(student_id, class_id).await?.status(), StatusCode::CREATED);

    let res = server.client.get(server.url("/turmas")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let classes = res.json::<Vec<Value>>().await?;
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0]["name"], "6º Ano A");
    assert_eq!(classes[0]["capacity"], 25);
    assert_eq!(classes[0]["enrolled_count"], 1);
    assert_eq!(classes[0]["remaining_capacity"], 24);

    let res = server.client.get(server.url(&format!("/turmas/{}", class_id))).send().await?;
    assert_eq!(res.json::<Value>().await?, classes[0]);
    Ok(())
}

#[tokio::test]
async fn class_validation_and_uniqueness() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/turmas"))
        .json(&json!({ "nome": "T", "capacidade": 0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert!(body["fields"]["name"].is_string(), "{}", body);
    assert!(body["fields"]["capacity"].is_string(), "{}", body);

    server.create_class("Turma A", 10).await?;
    let res = server
        .client
        .post(server.url("/turmas"))
        .json(&json!({ "name": "Turma A", "capacity": 20 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn capacity_cannot_drop_below_occupancy() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let class_id = server.create_class("Turma A", 3).await?;
    for name in ["Ana Silva", "Bruno Costa"] {
        let student_id = server.create_student(name, None, "ativo").await?;
        server.enroll(student_id, class_id).await?;
    }

    let update = |capacity: i64| {
        server
            .client
            .put(server.url(&format!("/turmas/{}", class_id)))
            .json(&json!({ "name": "Turma A", "capacity": capacity }))
            .send()
    };

    let res = update(1).await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert!(res.json::<Value>().await?["fields"]["capacity"].is_string());

    let res = update(2).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["capacity"], 2);
    assert_eq!(body["remaining_capacity"], 0);
    Ok(())
}

#[tokio::test]
async fn deleting_a_class_unenrolls_its_students() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let class_id = server.create_class("Turma A", 5).await?;
    let student_id = server.create_student("Ana Silva", None, "ativo").await?;
    server.enroll(student_id, class_id).await?;

    let res = server.client.delete(server.url(&format!("/turmas/{}", class_id))).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let student = server
        .client
        .get(server.url(&format!("/alunos/{}", student_id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert!(student["class_id"].is_null(), "{}", student);
    assert_eq!(student["status"], "inactive");

    let res = server.client.get(server.url(&format!("/turmas/{}", class_id))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
