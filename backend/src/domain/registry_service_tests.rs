use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use mockall::predicate::eq;

use super::*;
use crate::domain::catalog::seed_templates;
use crate::domain::error::ErrorCode;
use crate::domain::hub::seed_hubs;
use crate::domain::monster::Monster;
use crate::domain::ports::{
    MockHubRepository, MockMonsterRepository, MockQuestStore, MockTemplateRepository,
    MockUserDirectory,
};
use crate::test_support::MutableClock;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid timestamp")
}

struct Fixture {
    quests: MockQuestStore,
    templates: MockTemplateRepository,
    hubs: MockHubRepository,
    monsters: MockMonsterRepository,
    users: MockUserDirectory,
    clock: Arc<MutableClock>,
    policy: CreationPolicy,
}

impl Fixture {
    fn new() -> Self {
        Self {
            quests: MockQuestStore::new(),
            templates: MockTemplateRepository::new(),
            hubs: MockHubRepository::new(),
            monsters: MockMonsterRepository::new(),
            users: MockUserDirectory::new(),
            clock: Arc::new(MutableClock::fixed(now())),
            policy: CreationPolicy::Gated,
        }
    }

    fn with_template(mut self) -> Self {
        let template = seed_templates().remove(0);
        self.templates
            .expect_find()
            .returning(move |_| Ok(Some(template.clone())));
        self
    }

    fn with_hub(mut self) -> Self {
        let hub = seed_hubs().remove(0);
        self.hubs
            .expect_find()
            .returning(move |_| Ok(Some(hub.clone())));
        self
    }

    fn service(
        self,
    ) -> RegistryService<
        MockQuestStore,
        MockTemplateRepository,
        MockHubRepository,
        MockMonsterRepository,
        MockUserDirectory,
    > {
        RegistryService::new(
            Arc::new(self.quests),
            Arc::new(self.templates),
            Arc::new(self.hubs),
            Arc::new(self.monsters),
            Arc::new(self.users),
            self.clock,
            self.policy,
        )
    }
}

fn open_command() -> OpenInstance {
    OpenInstance {
        template_id: seed_templates().remove(0).id,
        hub_id: seed_hubs().remove(0).id,
        location: None,
        start_time: None,
    }
}

fn leveled_monster(user: &UserId, crystals: i64, coins: i64) -> Monster {
    let mut monster = Monster::starter(user.clone(), 4);
    monster.crystals = crystals;
    monster.level = crate::domain::monster::level_for(crystals);
    monster.coins = coins;
    monster
}

#[tokio::test]
async fn open_rejects_creators_below_minimum_level() {
    let creator = UserId::random();
    let mut fixture = Fixture::new().with_template().with_hub();
    let low = leveled_monster(&creator, 0, 1000);
    fixture
        .monsters
        .expect_ensure()
        .with(eq(creator.clone()))
        .return_once(move |_| Ok(low));
    fixture.monsters.expect_save().times(0);
    fixture.quests.expect_create().times(0);

    let error = fixture
        .service()
        .open_instance(&creator, open_command())
        .await
        .expect_err("gated");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn open_rejects_creators_who_cannot_afford_the_fee() {
    let creator = UserId::random();
    let mut fixture = Fixture::new().with_template().with_hub();
    let broke = leveled_monster(&creator, 400, 50);
    fixture
        .monsters
        .expect_ensure()
        .return_once(move |_| Ok(broke));
    fixture.quests.expect_create().times(0);

    let error = fixture
        .service()
        .open_instance(&creator, open_command())
        .await
        .expect_err("gated");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn open_charges_the_fee_and_commits_the_instance() {
    let creator = UserId::random();
    let mut fixture = Fixture::new().with_template().with_hub();
    let funded = leveled_monster(&creator, 400, 1000);
    fixture
        .monsters
        .expect_ensure()
        .return_once(move |_| Ok(funded));
    fixture
        .monsters
        .expect_save()
        .withf(|monster| monster.coins == 1000 - CREATION_COIN_COST)
        .times(1)
        .return_once(|_| Ok(()));
    fixture.quests.expect_create().times(1).return_once(|_| Ok(()));
    let member = creator.clone();
    fixture
        .quests
        .expect_participants()
        .returning(move |_| Ok(vec![member.clone()]));
    let named = creator.clone();
    fixture.users.expect_names().returning(move |_| {
        Ok(HashMap::from([(named.clone(), "Ada".to_owned())]))
    });

    let snapshot = fixture
        .service()
        .open_instance(&creator, open_command())
        .await
        .expect("instance opens");
    assert_eq!(snapshot.instance.creator.as_ref(), Some(&creator));
    assert_eq!(snapshot.instance.current_participants, 1);
    assert_eq!(snapshot.creator_name.as_deref(), Some("Ada"));
    assert_eq!(snapshot.instance.location, seed_hubs().remove(0).location);
    assert_eq!(
        snapshot.instance.deadline,
        now() + Duration::minutes(i64::from(snapshot.template.duration))
    );
}

#[tokio::test]
async fn open_policy_skips_the_economy_gate() {
    let creator = UserId::random();
    let mut fixture = Fixture::new().with_template().with_hub();
    fixture.policy = CreationPolicy::Open;
    fixture.monsters.expect_ensure().times(0);
    fixture.quests.expect_create().times(1).return_once(|_| Ok(()));
    fixture.quests.expect_participants().returning(|_| Ok(vec![]));
    fixture.users.expect_names().returning(|_| Ok(HashMap::new()));

    fixture
        .service()
        .open_instance(&creator, open_command())
        .await
        .expect("open creation succeeds");
}

#[tokio::test]
async fn join_surfaces_capacity_with_details() {
    let user = UserId::random();
    let template = seed_templates().remove(0);
    let instance = QuestInstance::open(
        &template,
        seed_hubs().remove(0).id,
        UserId::random(),
        "Main Street 1".to_owned(),
        None,
        now(),
    );
    let id = instance.id.clone();

    let mut fixture = Fixture::new().with_template();
    fixture
        .quests
        .expect_find()
        .returning(move |_| Ok(Some(instance.clone())));
    let max = template.max_participants;
    fixture
        .quests
        .expect_join()
        .withf(move |_, _, limit| *limit == max)
        .return_once(move |_, _, _| Ok(Some(JoinOutcome::Full { count: max })));

    let error = fixture
        .service()
        .join_instance(&id, &user)
        .await
        .expect_err("full");
    assert_eq!(error.code(), ErrorCode::Capacity);
    assert_eq!(
        error.details().and_then(|details| details.get("max")),
        Some(&serde_json::json!(max))
    );
}

#[tokio::test]
async fn join_after_the_deadline_deactivates_and_reports_expired() {
    let user = UserId::random();
    let template = seed_templates().remove(0);
    let instance = QuestInstance::open(
        &template,
        seed_hubs().remove(0).id,
        UserId::random(),
        "Main Street 1".to_owned(),
        None,
        now() - Duration::minutes(i64::from(template.duration) + 1),
    );
    let id = instance.id.clone();

    let mut fixture = Fixture::new();
    fixture
        .quests
        .expect_find()
        .returning(move |_| Ok(Some(instance.clone())));
    fixture
        .quests
        .expect_deactivate()
        .with(eq(id.clone()))
        .times(1)
        .return_once(|_| Ok(()));
    fixture.quests.expect_join().times(0);

    let error = fixture
        .service()
        .join_instance(&id, &user)
        .await
        .expect_err("expired");
    assert_eq!(error.code(), ErrorCode::Expired);
}

#[tokio::test]
async fn only_the_creator_may_delete() {
    let template = seed_templates().remove(0);
    let creator = UserId::random();
    let instance = QuestInstance::open(
        &template,
        seed_hubs().remove(0).id,
        creator.clone(),
        "Main Street 1".to_owned(),
        None,
        now(),
    );
    let id = instance.id.clone();

    let mut fixture = Fixture::new();
    fixture
        .quests
        .expect_find()
        .returning(move |_| Ok(Some(instance.clone())));
    fixture
        .quests
        .expect_delete()
        .with(eq(id.clone()))
        .times(1)
        .return_once(|_| Ok(true));

    let service = fixture.service();
    let error = service
        .delete_instance(&id, &UserId::random())
        .await
        .expect_err("stranger");
    assert_eq!(error.code(), ErrorCode::Forbidden);

    service
        .delete_instance(&id, &creator)
        .await
        .expect("creator deletes");
}

#[tokio::test]
async fn listing_sweeps_lapsed_instances() {
    let template = seed_templates().remove(0);
    let hub = seed_hubs().remove(0);
    let live = QuestInstance::open(
        &template,
        hub.id.clone(),
        UserId::random(),
        hub.location.clone(),
        None,
        now(),
    );
    let lapsed = QuestInstance::open(
        &template,
        hub.id.clone(),
        UserId::random(),
        hub.location.clone(),
        None,
        now() - Duration::minutes(i64::from(template.duration) + 5),
    );
    let lapsed_id = lapsed.id.clone();
    let live_id = live.id.clone();

    let mut fixture = Fixture::new().with_template();
    fixture
        .quests
        .expect_list_active()
        .return_once(move |_| Ok(vec![live.clone(), lapsed.clone()]));
    fixture
        .quests
        .expect_deactivate()
        .with(eq(lapsed_id))
        .times(1)
        .return_once(|_| Ok(()));
    fixture.quests.expect_participants().returning(|_| Ok(vec![]));
    fixture.users.expect_names().returning(|_| Ok(HashMap::new()));

    let snapshots = fixture
        .service()
        .list_instances(None)
        .await
        .expect("listing succeeds");
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].instance.id, live_id);
}
