use anyhow::Context;
use chrono::NaiveDate;

use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::database::models::{ClassSummary, NewClass, NewStudent, StudentStatus};
use crate::database::Store;

/// (name, capacity)
pub const CLASSES: [(&str, i32); 5] = [
    ("6º Ano A", 25),
    ("7º Ano A", 28),
    ("8º Ano A", 30),
    ("9º Ano A", 32),
    ("1º Ano Médio", 35),
];

/// (name, birth date, email, active, index into CLASSES)
pub const STUDENTS: [(&str, (i32, u32, u32), Option<&str>, bool, usize); 15] = [
    ("Ana Silva", (2010, 3, 15), Some("ana.silva@email.com"), true, 0),
    ("Bruno Costa", (2010, 7, 22), Some("bruno.costa@email.com"), true, 0),
    ("Carlos Santos", (2010, 11, 8), Some("carlos.santos@email.com"), false, 0),
    ("Diana Oliveira", (2009, 1, 30), Some("diana.oliveira@email.com"), true, 1),
    ("Eduardo Lima", (2009, 9, 12), Some("eduardo.lima@email.com"), true, 1),
    ("Fernanda Rocha", (2009, 5, 18), Some("fernanda.rocha@email.com"), true, 1),
    ("Gabriel Torres", (2008, 12, 3), Some("gabriel.torres@email.com"), true, 2),
    ("Helena Martins", (2008, 4, 25), Some("helena.martins@email.com"), false, 2),
    ("Igor Pereira", (2008, 8, 14), Some("igor.pereira@email.com"), true, 2),
    ("Júlia Andrade", (2008, 6, 7), None, true, 2),
    ("Kaique Ferreira", (2007, 2, 20), Some("kaique.ferreira@email.com"), true, 3),
    ("Larissa Mendes", (2007, 10, 11), Some("larissa.mendes@email.com"), true, 3),
    ("Marcos Vieira", (2007, 7, 29), None, false, 3),
    ("Natália Cardoso", (2006, 3, 16), Some("natalia.cardoso@email.com"), true, 4),
    ("Otávio Ribeiro", (2006, 11, 2), Some("otavio.ribeiro@email.com"), true, 4),
];

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.database.backend != StoreBackend::Postgres {
        anyhow::bail!("seeding needs the postgres store (ESCOLA_STORE=postgres)");
    }
    let store = crate::server::build_store(config).await?;
    let classes = seed(store.as_ref()).await?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&classes)?),
        OutputFormat::Text => {
            println!("Classes created: {}", classes.len());
            println!("Students created: {}", STUDENTS.len());
            println!();
            println!("Students per class:");
            for class in &classes {
                println!("  {}: {} students (capacity {})", class.name, class.enrolled_count, class.capacity);
            }
        }
    }
    Ok(())
}

/// Replaces every row with the sample data and returns the resulting occupancy
pub async fn seed(store: &dyn Store) -> anyhow::Result<Vec<ClassSummary>> {
    store.reset().await.context("failed to clear existing data")?;

    let mut class_ids = Vec::with_capacity(CLASSES.len());
    for (name, capacity) in CLASSES {
        let class = store
            .insert_class(&NewClass { name: name.to_string(), capacity })
            .await
            .with_context(|| format!("failed to create class {}", name))?;
        class_ids.push(class.id);
    }

    for (name, (year, month, day), email, active, class_index) in STUDENTS {
        let birth_date = NaiveDate::from_ymd_opt(year, month, day)
            .with_context(|| format!("invalid birth date for {}", name))?;
        let student = NewStudent {
            name: name.to_string(),
            birth_date,
            email: email.map(str::to_string),
            status: if active { StudentStatus::Active } else { StudentStatus::Inactive },
            class_id: class_ids.get(class_index).copied(),
        };
        store
            .insert_student(&student)
            .await
            .with_context(|| format!("failed to create student {}", name))?;
    }

    tracing::info!("Seeded {} classes and {} students", CLASSES.len(), STUDENTS.len());
    Ok(store.list_classes().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::filter::Filter;

    #[tokio::test]
    async fn seeds_sample_data_and_replaces_previous_rows() {
        let store = MemoryStore::new();
        seed(&store).await.unwrap();
        let classes = seed(&store).await.unwrap();

        let counts: Vec<i64> = classes.iter().map(|c| c.enrolled_count).collect();
        assert_eq!(counts, vec![3, 3, 4, 3, 2]);
        assert_eq!(store.list_students(&Filter::new()).await.unwrap().len(), 15);
    }

    #[tokio::test]
    async fn two_sample_students_have_no_email() {
        let store = MemoryStore::new();
        seed(&store).await.unwrap();
        let without_email: Vec<String> = store
            .list_students(&Filter::new())
            .await
            .unwrap()
            .into_iter()
            .filter(|s| s.email.is_none())
            .map(|s| s.name)
            .collect();
        assert_eq!(without_email, vec!["Júlia Andrade", "Marcos Vieira"]);
    }
}
