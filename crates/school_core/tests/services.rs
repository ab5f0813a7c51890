use rusqlite::Connection;
use school_core::db::open_db_in_memory;
use school_core::{
    Course, CourseService, EnrollmentRepository, EnrollmentService, ErrorKind, Group,
    GroupService, Lookup, NewCourse, NewGroup, NewStudent, ServiceError, SqliteCourseRepository,
    SqliteEnrollmentRepository, SqliteGroupRepository, SqliteStudentRepository, Student,
    StudentService, MAX_ASSIGNED_ID,
};

type Groups<'c> = GroupService<SqliteGroupRepository<'c>>;
type Courses<'c> = CourseService<SqliteCourseRepository<'c>>;
type Students<'c> = StudentService<SqliteStudentRepository<'c>, SqliteGroupRepository<'c>>;
type Enrollments<'c> = EnrollmentService<
    SqliteStudentRepository<'c>,
    SqliteCourseRepository<'c>,
    SqliteEnrollmentRepository<'c>,
>;

struct Services<'c> {
    groups: Groups<'c>,
    courses: Courses<'c>,
    students: Students<'c>,
    enrollments: Enrollments<'c>,
    enrollment_repo: SqliteEnrollmentRepository<'c>,
}

fn services(conn: &Connection) -> Services<'_> {
    let groups = SqliteGroupRepository::try_new(conn).unwrap();
    let courses = SqliteCourseRepository::try_new(conn).unwrap();
    let students = SqliteStudentRepository::try_new(conn).unwrap();
    let enrollments = SqliteEnrollmentRepository::try_new(conn).unwrap();
    Services {
        groups: GroupService::new(groups),
        courses: CourseService::new(courses),
        students: StudentService::new(students, groups),
        enrollments: EnrollmentService::new(students, courses, enrollments),
        enrollment_repo: enrollments,
    }
}

fn kind<T: std::fmt::Debug>(result: Result<T, ServiceError>) -> ErrorKind {
    result.unwrap_err().kind()
}

#[test]
fn create_returns_the_stored_record_for_both_identity_modes() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);

    let group = s.groups.create_group(NewGroup::new("AB-12")).unwrap();
    assert_eq!(group, Group::new(1, "AB-12"));
    assert_eq!(s.groups.get_group(group.id).unwrap(), group);

    let course = s
        .courses
        .create_course(NewCourse::with_id(10, "Math", "Math Basics"))
        .unwrap();
    assert_eq!(course, Course::new(10, "Math", "Math Basics"));

    let student = s
        .students
        .create_student(NewStudent::new(Some(group.id), "Jane", "Doe"))
        .unwrap();
    assert_eq!(s.students.get_student(student.id).unwrap(), student);
    assert_eq!(student.group_id, Some(group.id));

    let own_id = s
        .students
        .create_student(NewStudent::with_id(42, None, "John", "Roe"))
        .unwrap();
    assert_eq!(own_id, Student::new(42, None, "John", "Roe"));
}

#[test]
fn create_rejects_taken_ids_and_blank_names() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);
    s.groups.create_group(NewGroup::with_id(3, "AB-12")).unwrap();

    assert_eq!(
        kind(s.groups.create_group(NewGroup::with_id(3, "CD-34"))),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        kind(s.courses.create_course(NewCourse::new(" ", "blank"))),
        ErrorKind::InvalidArgument
    );
    assert_eq!(s.groups.get_group(3).unwrap().name, "AB-12");
}

#[test]
fn student_with_unknown_group_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);

    let err = s
        .students
        .create_student(NewStudent::new(Some(9), "Jane", "Doe"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(Lookup::Group(9))));

    let jane = s
        .students
        .create_student(NewStudent::new(None, "Jane", "Doe"))
        .unwrap();
    let moved = Student {
        group_id: Some(9),
        ..jane.clone()
    };
    assert_eq!(kind(s.students.update_student(&moved)), ErrorKind::NotFound);
    assert_eq!(s.students.get_student(jane.id).unwrap(), jane);
}

#[test]
fn update_and_delete_of_missing_entities_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);

    assert_eq!(
        kind(s.groups.update_group(&Group::new(1, "AB-12"))),
        ErrorKind::NotFound
    );
    assert_eq!(
        kind(s.courses.update_course(&Course::new(1, "Math", ""))),
        ErrorKind::NotFound
    );
    assert_eq!(kind(s.students.delete_student(1)), ErrorKind::NotFound);
    assert_eq!(kind(s.groups.delete_group(1)), ErrorKind::NotFound);
    assert_eq!(kind(s.courses.delete_course(1)), ErrorKind::NotFound);
    assert_eq!(kind(s.students.get_student(1)), ErrorKind::NotFound);
}

#[test]
fn updates_are_visible_afterwards() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);
    let group = s.groups.create_group(NewGroup::new("AB-12")).unwrap();
    let jane = s
        .students
        .create_student(NewStudent::new(None, "Jane", "Doe"))
        .unwrap();

    let renamed = Group::new(group.id, "AB-13");
    assert_eq!(s.groups.update_group(&renamed).unwrap(), renamed);

    let joined = Student::new(jane.id, Some(group.id), "Jane", "Smith");
    assert_eq!(s.students.update_student(&joined).unwrap(), joined);
    assert_eq!(s.students.get_group_members(group.id).unwrap(), vec![joined]);
}

#[test]
fn deleting_group_unsets_members_group_and_keeps_them() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);

    let group_a = s.groups.create_group(NewGroup::with_id(1, "Group A")).unwrap();
    let group_b = s.groups.create_group(NewGroup::with_id(2, "Group B")).unwrap();
    for (id, first) in [(1, "Ann"), (2, "Bob")] {
        s.students
            .create_student(NewStudent::with_id(id, Some(group_a.id), first, "A"))
            .unwrap();
    }
    s.students
        .create_student(NewStudent::with_id(3, Some(group_b.id), "Cid", "B"))
        .unwrap();

    assert_eq!(
        s.groups
            .find_all_groups_with_less_or_equal_student_count(1)
            .unwrap(),
        vec![group_b.clone()]
    );

    s.groups.delete_group(group_a.id).unwrap();

    for id in [1, 2] {
        assert_eq!(s.students.get_student(id).unwrap().group_id, None);
    }
    assert_eq!(s.students.get_student(3).unwrap().group_id, Some(2));
    assert_eq!(s.groups.get_all_groups().unwrap(), vec![group_b]);
}

#[test]
fn threshold_query_validates_and_reports_empty_result() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);

    let err = s
        .groups
        .find_all_groups_with_less_or_equal_student_count(-1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(
        kind(s.groups.find_all_groups_with_less_or_equal_student_count(0)),
        ErrorKind::NotFound
    );

    let group = s.groups.create_group(NewGroup::new("AB-12")).unwrap();
    s.students
        .create_student(NewStudent::new(Some(group.id), "Jane", "Doe"))
        .unwrap();
    assert_eq!(
        kind(s.groups.find_all_groups_with_less_or_equal_student_count(0)),
        ErrorKind::NotFound
    );
    assert_eq!(
        s.groups
            .find_all_groups_with_less_or_equal_student_count(i64::MAX)
            .unwrap(),
        vec![group]
    );
}

#[test]
fn empty_listings_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);

    assert_eq!(kind(s.groups.get_all_groups()), ErrorKind::NotFound);
    assert_eq!(kind(s.courses.get_all_courses()), ErrorKind::NotFound);
    assert_eq!(kind(s.students.get_all_students()), ErrorKind::NotFound);
    assert_eq!(
        kind(s.students.find_all_students_by_course_name("Math")),
        ErrorKind::NotFound
    );
    assert_eq!(
        kind(s.students.find_all_students_by_course_name("  ")),
        ErrorKind::InvalidArgument
    );
    assert!(s.students.get_all_ids().unwrap().is_empty());
}

#[test]
fn enrolling_then_finding_by_course_name() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);

    let course = s
        .courses
        .create_course(NewCourse::with_id(1, "Math", "Math Basics"))
        .unwrap();
    let student = s
        .students
        .create_student(NewStudent::with_id(4, None, "Dana", "Doe"))
        .unwrap();

    s.enrollments
        .add_student_to_course(student.id, course.id)
        .unwrap();

    assert!(s
        .enrollments
        .student_enrolled_on_course(student.id, course.id)
        .unwrap());
    assert!(s
        .students
        .find_all_students_by_course_name(&course.name)
        .unwrap()
        .contains(&student));
    assert_eq!(s.enrollments.courses_of_student(student.id).unwrap(), vec![course]);
}

#[test]
fn enrolling_twice_is_rejected_and_leaves_one_row() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);
    let course = s
        .courses
        .create_course(NewCourse::new("Math", "Math Basics"))
        .unwrap();
    let student = s
        .students
        .create_student(NewStudent::new(None, "Jane", "Doe"))
        .unwrap();

    s.enrollments
        .add_student_to_course(student.id, course.id)
        .unwrap();
    assert_eq!(
        kind(s.enrollments.add_student_to_course(student.id, course.id)),
        ErrorKind::InvalidArgument
    );
    assert_eq!(s.enrollment_repo.get_all().unwrap().len(), 1);
}

#[test]
fn enrollment_preconditions() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);
    let course = s
        .courses
        .create_course(NewCourse::new("Math", "Math Basics"))
        .unwrap();
    let student = s
        .students
        .create_student(NewStudent::new(None, "Jane", "Doe"))
        .unwrap();

    assert!(matches!(
        s.enrollments.add_student_to_course(99, course.id),
        Err(ServiceError::NotFound(Lookup::Student(99)))
    ));
    assert!(matches!(
        s.enrollments.add_student_to_course(student.id, 99),
        Err(ServiceError::NotFound(Lookup::Course(99)))
    ));
    assert_eq!(
        kind(s.enrollments.student_enrolled_on_course(student.id, 99)),
        ErrorKind::NotFound
    );
    assert_eq!(
        kind(s.enrollments.remove_student_from_course(student.id, course.id)),
        ErrorKind::InvalidArgument
    );

    s.enrollments
        .add_student_to_course(student.id, course.id)
        .unwrap();
    s.enrollments
        .remove_student_from_course(student.id, course.id)
        .unwrap();
    assert!(!s
        .enrollments
        .student_enrolled_on_course(student.id, course.id)
        .unwrap());
}

#[test]
fn deleting_student_removes_only_its_enrollments() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);
    let math = s
        .courses
        .create_course(NewCourse::new("Math", "Math Basics"))
        .unwrap();
    let art = s
        .courses
        .create_course(NewCourse::new("Art", "Art Basics"))
        .unwrap();
    let jane = s
        .students
        .create_student(NewStudent::new(None, "Jane", "Doe"))
        .unwrap();
    let john = s
        .students
        .create_student(NewStudent::new(None, "John", "Roe"))
        .unwrap();
    for course in [&math, &art] {
        s.enrollments.add_student_to_course(jane.id, course.id).unwrap();
        s.enrollments.add_student_to_course(john.id, course.id).unwrap();
    }

    s.students.delete_student(jane.id).unwrap();

    let remaining = s.enrollment_repo.get_all().unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|pair| pair.student_id == john.id));
    assert!(!s.students.exists(jane.id).unwrap());
}

#[test]
fn delete_all_operations_leave_empty_listings() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);
    let group = s.groups.create_group(NewGroup::new("AB-12")).unwrap();
    let course = s
        .courses
        .create_course(NewCourse::new("Math", "Math Basics"))
        .unwrap();
    let student = s
        .students
        .create_student(NewStudent::new(Some(group.id), "Jane", "Doe"))
        .unwrap();
    s.enrollments
        .add_student_to_course(student.id, course.id)
        .unwrap();

    assert_eq!(s.enrollments.delete_all_enrollments().unwrap(), 1);
    assert!(s.students.exists(student.id).unwrap());

    assert_eq!(s.groups.delete_all_groups().unwrap(), 1);
    assert_eq!(s.students.get_student(student.id).unwrap().group_id, None);

    assert_eq!(s.courses.delete_all_courses().unwrap(), 1);
    assert_eq!(s.students.delete_all_students().unwrap(), 1);
    assert!(s.students.get_all_ids().unwrap().is_empty());

    let fresh = s.groups.create_group(NewGroup::new("CD-34")).unwrap();
    assert_eq!(fresh.id, 1);
}

#[test]
fn duplicate_id_is_rejected_and_keeps_first_record() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);
    s.students
        .create_student(NewStudent::with_id(5, None, "Jane", "Doe"))
        .unwrap();

    let err = s
        .students
        .create_student(NewStudent::with_id(5, None, "John", "Roe"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.to_string().contains("already used"));
    assert_eq!(s.students.get_all_students().unwrap().len(), 1);
    assert_eq!(s.students.get_student(5).unwrap().first_name, "Jane");
}

#[test]
fn caller_id_limit_keeps_store_assigned_creation_working() {
    let conn = open_db_in_memory().unwrap();
    let s = services(&conn);

    let err = s
        .students
        .create_student(NewStudent::with_id(i64::MAX, None, "Jane", "Doe"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(s.students.get_all_ids().unwrap().is_empty());

    s.students
        .create_student(NewStudent::with_id(MAX_ASSIGNED_ID, None, "Jane", "Doe"))
        .unwrap();
    let next = s
        .students
        .create_student(NewStudent::new(None, "John", "Roe"))
        .unwrap();
    assert_eq!(next.id, MAX_ASSIGNED_ID + 1);
}
