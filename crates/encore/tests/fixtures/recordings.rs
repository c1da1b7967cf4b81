// Code generated by encore. DO NOT EDIT.

#![allow(unused_imports)]

use super::*;

/// Loads recordings captured by encore.
pub fn load(target: &impl encore::Load) -> encore::Result<()> {
    target.load(
        "canonical_example",
        vec![
            encore::Recording::new::<crate::common::Visit>(
                "visit",
                crate::common::Visit {
                    id: encore::decode::<uuid::Uuid>("6ba7b810-9dad-11d1-80b4-00c04fd430c8")?,
                    day: encore::decode::<chrono::NaiveDate>("2024-03-01")?,
                    dog: encore::ptr(Dog {
                        name: "Lido".into(),
                        breed: "Terrier".into(),
                        ..Default::default()
                    }),
                },
            ),
            encore::Recording::new::<uuid::Uuid>(
                "id",
                encore::decode::<uuid::Uuid>("6ba7b810-9dad-11d1-80b4-00c04fd430c8")?,
            ),
        ],
    )?;
    target.load(
        "kv_example",
        vec![
            encore::Recording::new::<crate::common::Dog>(
                "dog1",
                crate::common::Dog {
                    name: "Lido".into(),
                    breed: "Terrier".into(),
                    ..Default::default()
                },
            ),
            encore::Recording::new::<crate::common::Dog>(
                "dog2",
                crate::common::Dog {
                    name: "Rex".into(),
                    breed: "Boxer".into(),
                    age: 4,
                    note: r#"good
boy
"#.into(),
                },
            ),
        ],
    )?;
    target.load(
        "pointer_example",
        vec![
            encore::Recording::new::<Box<i32>>("boxed", encore::ptr(5i32)),
            encore::Recording::new::<Option<Box<u8>>>("maybe", Some(encore::ptr(7u8))),
            encore::Recording::new::<Vec<crate::common::Size>>(
                "sizes",
                vec![
                    crate::common::Size::Small,
                    crate::common::Size::Large { kg: 30 },
                ],
            ),
        ],
    )?;
    target.load(
        "seq_example",
        vec![
            encore::Recording::new::<String>(0u64, "first".into()),
            encore::Recording::new::<String>(1u64, "second".into()),
            encore::Recording::new::<String>(2u64, "third".into()),
        ],
    )?;
    target.load(
        "set_example",
        vec![
            encore::Recording::new::<crate::common::Litter>(
                "litter",
                crate::common::Litter {
                    pups: ["Ace".into(), "Max".into(), "Rex".into()].into(),
                },
            ),
        ],
    )?;
    Ok(())
}

/// Loads recordings captured by encore.
pub fn load_registry(target: &impl encore::Load) -> encore::Result<()> {
    target.load(
        "kennel",
        vec![
            encore::Recording::new::<String>("owner", "Ada".into()),
            encore::Recording::new::<u32>(0u64, 3),
        ],
    )?;
    Ok(())
}
