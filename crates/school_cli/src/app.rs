//! Service wiring for one open connection.

use rusqlite::Connection;
use school_core::{
    EnrollmentService, GroupService, RepoResult, SeedService, SqliteCourseRepository,
    SqliteEnrollmentRepository, SqliteGroupRepository, SqliteSchoolRepository,
    SqliteStudentRepository, StudentService,
};

pub type SchoolSeeder<'conn> = SeedService<
    SqliteGroupRepository<'conn>,
    SqliteCourseRepository<'conn>,
    SqliteStudentRepository<'conn>,
    SqliteEnrollmentRepository<'conn>,
    SqliteSchoolRepository<'conn>,
>;

/// Every service the console menu talks to.
pub struct School<'conn> {
    pub groups: GroupService<SqliteGroupRepository<'conn>>,
    pub students: StudentService<SqliteStudentRepository<'conn>, SqliteGroupRepository<'conn>>,
    pub enrollments: EnrollmentService<
        SqliteStudentRepository<'conn>,
        SqliteCourseRepository<'conn>,
        SqliteEnrollmentRepository<'conn>,
    >,
    pub seeder: SchoolSeeder<'conn>,
}

impl<'conn> School<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let groups = SqliteGroupRepository::try_new(conn)?;
        let courses = SqliteCourseRepository::try_new(conn)?;
        let students = SqliteStudentRepository::try_new(conn)?;
        let enrollments = SqliteEnrollmentRepository::try_new(conn)?;
        let school = SqliteSchoolRepository::try_new(conn)?;

        Ok(Self {
            groups: GroupService::new(groups),
            students: StudentService::new(students, groups),
            enrollments: EnrollmentService::new(students, courses, enrollments),
            seeder: SeedService::new(groups, courses, students, enrollments, school),
        })
    }
}
