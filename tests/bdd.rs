use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use cucumber::{given, then, when, World as _};
use tripsplit::services::{
    export::{export_file_name, export_workbook},
    split,
    store::TripStore,
};

#[derive(Debug, cucumber::World, Default)]
struct SplitWorld {
    store: TripStore,
    export: Option<Result<(String, Vec<u8>), String>>,
}

const EPSILON: f64 = 1e-9;

fn names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

#[given("an empty trip store")]
fn given_empty_store(world: &mut SplitWorld) {
    world.store = TripStore::new();
    world.export = None;
}

#[given(regex = r#"^a trip "([^"]+)" with members "([^"]*)"$"#)]
fn given_trip_with_members(world: &mut SplitWorld, trip: String, members: String) {
    assert!(world.store.add_trip(&trip));
    for member in names(&members) {
        assert!(world.store.add_member(&trip, &member));
    }
}

#[when(regex = r#"^I add the trip "([^"]*)"$"#)]
fn when_add_trip(world: &mut SplitWorld, trip: String) {
    world.store.add_trip(&trip);
}

#[when(regex = r#"^I add the member "([^"]*)" to "([^"]+)"$"#)]
fn when_add_member(world: &mut SplitWorld, member: String, trip: String) {
    world.store.add_member(&trip, &member);
}

#[when(regex = r#"^I select the trip "([^"]+)"$"#)]
fn when_select_trip(world: &mut SplitWorld, trip: String) {
    world.store.switch_trip(&trip);
}

#[when(regex = r#"^I delete the trip "([^"]+)"$"#)]
fn when_delete_trip(world: &mut SplitWorld, trip: String) {
    world.store.delete_trip(&trip);
}

#[when(regex = r#"^"([^"]+)" pays (\d+(?:\.\d+)?) for "([^"]+)" on "([^"]+)"$"#)]
fn when_member_pays(
    world: &mut SplitWorld,
    member: String,
    amount: f64,
    description: String,
    trip: String,
) {
    assert!(world
        .store
        .add_expense(&trip, &member, &description, amount));
}

#[when(regex = r#"^I export the trip "([^"]+)"$"#)]
fn when_export(world: &mut SplitWorld, trip: String) {
    let stored = world
        .store
        .trip(&trip)
        .expect("trip must exist before exporting");
    let result = export_workbook(
        &stored.expenses,
        &split::shares(stored),
        &split::give_receive(stored),
    )
    .map(|bytes| (export_file_name(&trip), bytes))
    .map_err(|err| err.to_string());
    world.export = Some(result);
}

#[then(regex = r"^the store holds (\d+) trips$")]
fn then_store_holds(world: &mut SplitWorld, expected: usize) {
    assert_eq!(world.store.len(), expected);
}

#[then(regex = r#"^the trip "([^"]+)" has members "([^"]*)"$"#)]
fn then_trip_has_members(world: &mut SplitWorld, trip: String, members: String) {
    let stored = world.store.trip(&trip).expect("trip exists");
    assert_eq!(stored.members, names(&members));
}

#[then("no trip is selected")]
fn then_no_selection(world: &mut SplitWorld) {
    assert_eq!(world.store.current(), None);
}

#[then(regex = r#"^the selected trip is "([^"]+)"$"#)]
fn then_selected(world: &mut SplitWorld, trip: String) {
    assert_eq!(world.store.current(), Some(trip.as_str()));
}

#[then(regex = r#"^the trip "([^"]+)" has a total expense of (\d+(?:\.\d+)?)$"#)]
fn then_total(world: &mut SplitWorld, trip: String, expected: f64) {
    let stored = world.store.trip(&trip).expect("trip exists");
    let sum: f64 = stored.expenses.iter().map(|expense| expense.amount).sum();
    assert!((stored.total_expense - expected).abs() < EPSILON);
    assert!((stored.total_expense - sum).abs() < EPSILON);
}

#[then(regex = r#"^every share on "([^"]+)" is (\d+(?:\.\d+)?)$"#)]
fn then_every_share(world: &mut SplitWorld, trip: String, expected: f64) {
    let shares = split::calculate_shares(&world.store, &trip);
    assert!(!shares.is_empty());
    for share in shares {
        assert!(
            (share.amount - expected).abs() < EPSILON,
            "{} has share {}",
            share.member,
            share.amount
        );
    }
}

#[then(regex = r#"^"([^"]+)" has a net balance of (-?\d+(?:\.\d+)?) on "([^"]+)"$"#)]
fn then_net_balance(world: &mut SplitWorld, member: String, expected: f64, trip: String) {
    let balances = split::calculate_give_receive(&world.store, &trip);
    let net = balances
        .iter()
        .find(|item| item.member == member)
        .map(|item| item.amount)
        .expect("member has a balance");
    assert!((net - expected).abs() < EPSILON, "net was {net}");
}

#[then(regex = r#"^the net balances on "([^"]+)" add up to (-?\d+(?:\.\d+)?)$"#)]
fn then_nets_sum(world: &mut SplitWorld, trip: String, expected: f64) {
    let total: f64 = split::calculate_give_receive(&world.store, &trip)
        .iter()
        .map(|item| item.amount)
        .sum();
    assert!((total - expected).abs() < EPSILON, "sum was {total}");
}

#[then(regex = r#"^"([^"]+)" has no shares and no balances$"#)]
fn then_no_split(world: &mut SplitWorld, trip: String) {
    assert!(split::calculate_shares(&world.store, &trip).is_empty());
    assert!(split::calculate_give_receive(&world.store, &trip).is_empty());
}

#[then(regex = r#"^the export is rejected with "([^"]+)"$"#)]
fn then_export_rejected(world: &mut SplitWorld, message: String) {
    match world.export.as_ref().expect("export attempted") {
        Err(err) => assert_eq!(err, &message),
        Ok(_) => panic!("export unexpectedly succeeded"),
    }
}

#[then(regex = r#"^the export produces a workbook named "([^"]+)"$"#)]
fn then_export_produced(world: &mut SplitWorld, file_name: String) {
    match world.export.as_ref().expect("export attempted") {
        Ok((name, bytes)) => {
            assert_eq!(name, &file_name);
            assert!(bytes.starts_with(b"PK"));
        }
        Err(err) => panic!("export failed: {err}"),
    }
}

fn exported_workbook(world: &SplitWorld) -> Xlsx<Cursor<Vec<u8>>> {
    match world.export.as_ref().expect("export attempted") {
        Ok((_, bytes)) => {
            open_workbook_from_rs(Cursor::new(bytes.clone())).expect("readable workbook")
        }
        Err(err) => panic!("export failed: {err}"),
    }
}

#[then(regex = r#"^the workbook has the sheets "([^"]+)"$"#)]
fn then_workbook_sheets(world: &mut SplitWorld, sheets: String) {
    let workbook = exported_workbook(world);
    assert_eq!(workbook.sheet_names(), names(&sheets));
}

#[then(regex = r#"^the "([^"]+)" sheet starts with the columns "([^"]+)"$"#)]
fn then_sheet_header(world: &mut SplitWorld, sheet: String, columns: String) {
    let mut workbook = exported_workbook(world);
    let range = workbook.worksheet_range(&sheet).expect("sheet exists");
    let header: Vec<String> = range
        .rows()
        .next()
        .expect("header row")
        .iter()
        .map(|cell| match cell {
            Data::String(value) => value.clone(),
            other => panic!("header cell {other:?} is not text"),
        })
        .collect();
    assert_eq!(header, names(&columns));
}

#[then(regex = r#"^the "([^"]+)" sheet lists the members "([^"]+)"$"#)]
fn then_sheet_first_column(world: &mut SplitWorld, sheet: String, members: String) {
    let mut workbook = exported_workbook(world);
    let range = workbook.worksheet_range(&sheet).expect("sheet exists");
    let listed: Vec<String> = range
        .rows()
        .skip(1)
        .map(|row| row[0].to_string())
        .collect();
    assert_eq!(listed, names(&members));
}

#[tokio::main]
async fn main() {
    SplitWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run_and_exit("tests/features")
        .await;
}
