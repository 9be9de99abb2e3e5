//! Demo catalog loaded at startup when `seed_demo_data` is set

use bd_core::result::BdResult;
use bd_core::traits::{ROLE_ADMIN, ROLE_ARCHITECT, ROLE_USER};
use bd_db::Repositories;
use bd_models::{ConstructionType, MaterialType, User};

const MATERIALS: [(&str, &str, &str, f64); 5] = [
    ("Ce", "Cement", "kg", 1000.0),
    ("Gr", "Gravel", "kg", 1500.0),
    ("Ar", "Sand", "kg", 2500.0),
    ("Ma", "Wood", "unit", 3000.0),
    ("Ad", "Adobe", "kg", 3500.0),
];

/// Quantities follow the order of `MATERIALS`
const CONSTRUCTION_TYPES: [(&str, i32, [f64; 5]); 5] = [
    ("HOUSE", 3, [100.0, 50.0, 90.0, 20.0, 100.0]),
    ("LAKE", 2, [50.0, 60.0, 80.0, 10.0, 20.0]),
    ("SOCCER_FIELD", 1, [20.0, 20.0, 20.0, 20.0, 20.0]),
    ("BUILDING", 6, [200.0, 100.0, 180.0, 40.0, 200.0]),
    ("GYM", 4, [50.0, 25.0, 45.0, 20.0, 30.0]),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub materials: usize,
    pub construction_types: usize,
}

/// Insert whatever part of the demo catalog is missing
pub async fn seed_demo_data(repos: &Repositories) -> BdResult<SeedReport> {
    let mut report = SeedReport::default();

    let users = [
        User::new("admin", "Administrator")
            .with_role(ROLE_ADMIN)
            .with_role(ROLE_ARCHITECT),
        User::new("arq1", "Architect One").with_role(ROLE_ARCHITECT),
        User::new("user1", "Regular User").with_role(ROLE_USER),
    ];
    for user in users {
        if repos.users.find_by_username(&user.username).await?.is_none() {
            repos.users.save(user).await?;
            report.users += 1;
        }
    }

    let mut material_ids = Vec::with_capacity(MATERIALS.len());
    for (code, name, unit, stock) in MATERIALS {
        let material = match repos.materials.find_by_code(code).await? {
            Some(existing) => existing,
            None => {
                report.materials += 1;
                repos
                    .materials
                    .save(MaterialType::new(code, name, unit, stock))
                    .await?
            }
        };
        material_ids.push(material.id.unwrap_or_default());
    }

    for (name, duration, quantities) in CONSTRUCTION_TYPES {
        if repos.construction_types.find_by_name(name).await?.is_some() {
            continue;
        }
        let construction_type = material_ids
            .iter()
            .zip(quantities)
            .fold(ConstructionType::new(name, duration), |t, (id, qty)| {
                t.with_line(*id, qty)
            });
        repos.construction_types.save(construction_type).await?;
        report.construction_types += 1;
    }

    tracing::info!(
        users = report.users,
        materials = report.materials,
        construction_types = report.construction_types,
        "Demo data loaded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bd_core::traits::UserContext;

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let repos = Repositories::in_memory();
        let first = seed_demo_data(&repos).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                users: 3,
                materials: 5,
                construction_types: 5
            }
        );
        assert_eq!(seed_demo_data(&repos).await.unwrap(), SeedReport::default());
    }

    #[tokio::test]
    async fn test_seeded_catalog() {
        let repos = Repositories::in_memory();
        seed_demo_data(&repos).await.unwrap();

        let admin = repos.users.find_by_username("admin").await.unwrap().unwrap();
        assert!(admin.is_admin() && admin.is_architect());
        let user = repos.users.find_by_username("user1").await.unwrap().unwrap();
        assert!(!user.is_architect());

        let house = repos.construction_types.find_by_name("HOUSE").await.unwrap().unwrap();
        assert_eq!(house.duration_days, 3);
        let quantities: Vec<f64> = house.recipe.iter().map(|l| l.quantity).collect();
        assert_eq!(quantities, vec![100.0, 50.0, 90.0, 20.0, 100.0]);

        let wood = repos.materials.find_by_code("Ma").await.unwrap().unwrap();
        assert_eq!((wood.unit.as_str(), wood.stock), ("unit", 3000.0));
    }
}
