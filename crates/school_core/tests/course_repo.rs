use school_core::db::open_db_in_memory;
use school_core::{
    Course, CourseRepository, EnrollmentRepository, SqliteCourseRepository,
    SqliteEnrollmentRepository, SqliteStudentRepository, StudentRepository,
};

#[test]
fn save_update_and_find_by_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::try_new(&conn).unwrap();

    let math = repo.save_without_id("Math", "Math Basics").unwrap();
    assert!(repo.save(&Course::new(40, "Art", "Art Basics")).unwrap());
    assert!(!repo.save(&Course::new(40, "Music", "Music Basics")).unwrap());

    assert!(repo
        .update(&Course::new(math, "Math", "Advanced Math"))
        .unwrap());
    assert_eq!(
        repo.find_by_name("Math").unwrap(),
        vec![Course::new(math, "Math", "Advanced Math")]
    );
    assert!(repo.find_by_name("math").unwrap().is_empty());
    assert_eq!(repo.get_all_ids().unwrap(), vec![math, 40]);
}

#[test]
fn delete_by_id_removes_enrollments_but_not_students() {
    let conn = open_db_in_memory().unwrap();
    let courses = SqliteCourseRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let enrollments = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let math = courses.save_without_id("Math", "Math Basics").unwrap();
    let art = courses.save_without_id("Art", "Art Basics").unwrap();
    let jane = students.save_without_id(None, "Jane", "Doe").unwrap().unwrap();
    assert!(enrollments.add_student_to_course(jane, math).unwrap());
    assert!(enrollments.add_student_to_course(jane, art).unwrap());

    assert!(courses.delete_by_id(math).unwrap());
    assert!(!courses.delete_by_id(math).unwrap());

    assert!(students.exists_by_id(jane).unwrap());
    assert_eq!(enrollments.course_ids_for_student(jane).unwrap(), vec![art]);
    assert!(enrollments.student_ids_for_course(math).unwrap().is_empty());
}

#[test]
fn delete_all_clears_enrollments_and_restarts_sequence() {
    let conn = open_db_in_memory().unwrap();
    let courses = SqliteCourseRepository::try_new(&conn).unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let enrollments = SqliteEnrollmentRepository::try_new(&conn).unwrap();

    let math = courses.save_without_id("Math", "Math Basics").unwrap();
    courses.save_without_id("Art", "Art Basics").unwrap();
    let jane = students.save_without_id(None, "Jane", "Doe").unwrap().unwrap();
    enrollments.add_student_to_course(jane, math).unwrap();

    assert_eq!(courses.delete_all().unwrap(), 2);
    assert!(enrollments.get_all().unwrap().is_empty());
    assert_eq!(students.get_all_ids().unwrap(), vec![jane]);
    assert_eq!(courses.save_without_id("Music", "Music Basics").unwrap(), 1);
}
