use school_core::db::open_db_in_memory;
use school_core::{
    Group, GroupRepository, ModelValidationError, RepoError, SqliteGroupRepository,
    SqliteStudentRepository, StudentRepository, MAX_ASSIGNED_ID,
};

#[test]
fn save_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupRepository::try_new(&conn).unwrap();

    assert!(repo.save(&Group::new(5, "AB-12")).unwrap());
    let id = repo.save_without_id("CD-34").unwrap();

    assert_eq!(repo.get_by_id(5).unwrap(), Some(Group::new(5, "AB-12")));
    assert_eq!(repo.get_by_id(id).unwrap(), Some(Group::new(id, "CD-34")));
    assert_eq!(repo.get_by_id(999).unwrap(), None);
    assert_eq!(repo.get_all_ids().unwrap(), vec![5, id]);
}

#[test]
fn save_with_taken_id_returns_false_and_keeps_first_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupRepository::try_new(&conn).unwrap();

    assert!(repo.save(&Group::new(1, "AB-12")).unwrap());
    assert!(!repo.save(&Group::new(1, "ZZ-99")).unwrap());
    assert_eq!(repo.get_all().unwrap(), vec![Group::new(1, "AB-12")]);
}

#[test]
fn highest_assignable_id_leaves_room_for_the_sequence() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.save(&Group::new(MAX_ASSIGNED_ID + 1, "AB-12")),
        Err(RepoError::Validation(ModelValidationError::IdAboveLimit { .. }))
    ));
    assert!(repo.save(&Group::new(MAX_ASSIGNED_ID, "AB-12")).unwrap());
    assert_eq!(repo.save_without_id("CD-34").unwrap(), MAX_ASSIGNED_ID + 1);
    assert!(repo.update(&Group::new(MAX_ASSIGNED_ID + 1, "CD-35")).unwrap());
}

#[test]
fn blank_name_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.save_without_id("  "),
        Err(RepoError::Validation(_))
    ));
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn update_reports_whether_the_group_existed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupRepository::try_new(&conn).unwrap();
    let id = repo.save_without_id("AB-12").unwrap();

    assert!(repo.update(&Group::new(id, "AB-13")).unwrap());
    assert!(!repo.update(&Group::new(id + 1, "XX-00")).unwrap());
    assert_eq!(repo.get_by_id(id).unwrap().unwrap().name, "AB-13");
}

#[test]
fn delete_by_id_detaches_members_without_deleting_them() {
    let conn = open_db_in_memory().unwrap();
    let groups = SqliteGroupRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let group_id = groups.save_without_id("AB-12").unwrap();
    let other_id = groups.save_without_id("CD-34").unwrap();
    let member = students
        .save_without_id(Some(group_id), "Jane", "Doe")
        .unwrap()
        .unwrap();
    let outsider = students
        .save_without_id(Some(other_id), "John", "Roe")
        .unwrap()
        .unwrap();

    assert!(groups.delete_by_id(group_id).unwrap());
    assert!(!groups.delete_by_id(group_id).unwrap());

    assert!(!groups.exists_by_id(group_id).unwrap());
    assert_eq!(students.get_by_id(member).unwrap().unwrap().group_id, None);
    assert_eq!(
        students.get_by_id(outsider).unwrap().unwrap().group_id,
        Some(other_id)
    );
}

#[test]
fn delete_all_restarts_sequence_and_keeps_students() {
    let conn = open_db_in_memory().unwrap();
    let groups = SqliteGroupRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let group_id = groups.save_without_id("AB-12").unwrap();
    groups.save_without_id("CD-34").unwrap();
    students
        .save_without_id(Some(group_id), "Jane", "Doe")
        .unwrap();

    assert_eq!(groups.delete_all().unwrap(), 2);
    assert!(groups.get_all().unwrap().is_empty());
    assert_eq!(students.get_all().unwrap().len(), 1);
    assert_eq!(students.get_all().unwrap()[0].group_id, None);

    assert_eq!(groups.save_without_id("EF-56").unwrap(), 1);
}

#[test]
fn student_count_threshold_includes_empty_groups() {
    let conn = open_db_in_memory().unwrap();
    let groups = SqliteGroupRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let g1 = groups.save_without_id("AA-11").unwrap();
    let g2 = groups.save_without_id("BB-22").unwrap();
    let g3 = groups.save_without_id("CC-33").unwrap();
    for name in ["A", "B", "C"] {
        students.save_without_id(Some(g1), name, "One").unwrap();
    }
    students.save_without_id(Some(g2), "D", "Two").unwrap();

    let ids = |max| -> Vec<i64> {
        groups
            .find_with_student_count_at_most(max)
            .unwrap()
            .into_iter()
            .map(|group| group.id)
            .collect()
    };
    assert_eq!(ids(0), vec![g3]);
    assert_eq!(ids(1), vec![g2, g3]);
    assert_eq!(ids(3), vec![g1, g2, g3]);
    assert_eq!(ids(i64::from(u32::MAX) + 1), vec![g1, g2, g3]);
}
