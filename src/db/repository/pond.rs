use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::{DatabaseError, TIMESTAMP_FORMAT};
use crate::models::Pond;

pub fn insert_pond(conn: &Connection, pond: &Pond) -> Result<(), DatabaseError> {
    if pond.name.trim().is_empty() {
        return Err(DatabaseError::ConstraintViolation("Pond name is required".into()));
    }
    if !pond.area_decimal.is_finite() || pond.area_decimal < 0.0 {
        return Err(DatabaseError::ConstraintViolation(format!(
            "Pond area must be a non-negative number, got {}",
            pond.area_decimal
        )));
    }

    let now = Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string();
    conn.execute(
        "INSERT INTO ponds (id, name, area_decimal, location, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            pond.id.to_string(),
            pond.name,
            pond.area_decimal,
            pond.location,
            now,
        ],
    )?;
    Ok(())
}

pub fn get_pond(conn: &Connection, id: &Uuid) -> Result<Option<Pond>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, area_decimal, location FROM ponds WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()?;

    row.map(pond_from_row).transpose()
}

/// All ponds, alphabetical.
pub fn list_ponds(conn: &Connection) -> Result<Vec<Pond>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name, area_decimal, location FROM ponds ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut ponds = Vec::new();
    for row in rows {
        ponds.push(pond_from_row(row?)?);
    }
    Ok(ponds)
}

type PondRow = (String, String, f64, Option<String>);

fn pond_from_row((id, name, area_decimal, location): PondRow) -> Result<Pond, DatabaseError> {
    Ok(Pond {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name,
        area_decimal,
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn pond(name: &str) -> Pond {
        Pond {
            id: Uuid::new_v4(),
            name: name.into(),
            area_decimal: 33.0,
            location: Some("North field".into()),
        }
    }

    #[test]
    fn insert_and_get_pond() {
        let conn = open_memory_database().unwrap();
        let p = pond("Pond A");
        insert_pond(&conn, &p).unwrap();

        let loaded = get_pond(&conn, &p.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Pond A");
        assert_eq!(loaded.area_decimal, 33.0);
        assert_eq!(loaded.location.as_deref(), Some("North field"));
    }

    #[test]
    fn missing_pond_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_pond(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn list_is_alphabetical() {
        let conn = open_memory_database().unwrap();
        insert_pond(&conn, &pond("Nursery")).unwrap();
        insert_pond(&conn, &pond("Grow-out 1")).unwrap();

        let names: Vec<String> = list_ponds(&conn).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Grow-out 1", "Nursery"]);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let conn = open_memory_database().unwrap();
        insert_pond(&conn, &pond("Pond A")).unwrap();
        assert!(matches!(insert_pond(&conn, &pond("Pond A")), Err(DatabaseError::Sqlite(_))));
    }

    #[test]
    fn blank_name_and_negative_area_are_rejected() {
        let conn = open_memory_database().unwrap();
        let mut p = pond("  ");
        assert!(matches!(insert_pond(&conn, &p), Err(DatabaseError::ConstraintViolation(_))));
        p.name = "Pond B".into();
        p.area_decimal = -1.0;
        assert!(matches!(insert_pond(&conn, &p), Err(DatabaseError::ConstraintViolation(_))));
    }
}
