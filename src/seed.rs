use sqlx::SqlitePool;

/// Loads a demo clinic fixture so the visit forms have owners, pets, and
/// veterinarians to work against. There is no UI for creating those rows;
/// visits are the only thing managed through the browser.
///
/// Refuses to run against a database that already has owners.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM owners")
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        return Err("Database already contains owners; refusing to seed".into());
    }

    let owners: &[(&str, &str, &str, &str, &str)] = &[
        ("George", "Franklin", "110 W. Liberty St.", "Madison", "6085551023"),
        ("Betty", "Davis", "638 Cardinal Ave.", "Sun Prairie", "6085551749"),
        ("Eduardo", "Rodriquez", "2693 Commerce St.", "McFarland", "6085558763"),
    ];

    // Pets keyed by owner position above.
    let pets: &[(&str, &str, usize)] = &[
        ("Leo", "2020-09-07", 0),
        ("Basil", "2022-08-06", 1),
        ("Rosy", "2021-04-17", 2),
        ("Jewel", "2021-03-07", 2),
    ];

    let vets: &[(&str, &str)] = &[
        ("James", "Carter"),
        ("Helen", "Leary"),
        ("Linda", "Douglas"),
    ];

    let mut tx = pool.begin().await?;
    let mut owner_ids = Vec::with_capacity(owners.len());

    for (first, last, address, city, telephone) in owners {
        let result = sqlx::query(
            "INSERT INTO owners (first_name, last_name, address, city, telephone) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(first)
        .bind(last)
        .bind(address)
        .bind(city)
        .bind(telephone)
        .execute(&mut *tx)
        .await?;
        owner_ids.push(result.last_insert_rowid());
    }

    for (name, birth_date, owner_index) in pets {
        sqlx::query("INSERT INTO pets (name, birth_date, owner_id) VALUES (?, ?, ?)")
            .bind(name)
            .bind(birth_date)
            .bind(owner_ids[*owner_index])
            .execute(&mut *tx)
            .await?;
    }

    for (first, last) in vets {
        sqlx::query("INSERT INTO vets (first_name, last_name) VALUES (?, ?)")
            .bind(first)
            .bind(last)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    println!(
        "Seeded {} owners, {} pets, {} vets",
        owners.len(),
        pets.len(),
        vets.len()
    );
    Ok(())
}
