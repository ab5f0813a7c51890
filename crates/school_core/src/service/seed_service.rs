//! Demo data generator.
//!
//! # Responsibility
//! - Wipe the whole store.
//! - Fill it with random groups, the fixed course catalogue, students and
//!   their enrollments.
//!
//! # Invariants
//! - The same `SeedPlan` on an empty store always produces the same rows.
//! - Every generated student is enrolled on at least one course when
//!   courses exist and `max_courses_per_student > 0`.

use super::{confirm, ServiceError, ServiceResult};
use crate::model::course::CourseId;
use crate::model::group::GroupId;
use crate::model::student::StudentId;
use crate::repo::course_repo::CourseRepository;
use crate::repo::enrollment_repo::EnrollmentRepository;
use crate::repo::group_repo::GroupRepository;
use crate::repo::school_repo::{SchoolCounts, SchoolRepository};
use crate::repo::student_repo::StudentRepository;
use crate::repo::AtomicScope;
use log::info;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

pub const COURSE_NAMES: [&str; 10] = [
    "Math",
    "Biology",
    "Chemistry",
    "Physics",
    "History",
    "English",
    "Art",
    "Computer Science",
    "Economics",
    "Music",
];

const FIRST_NAMES: [&str; 20] = [
    "Liam", "Olivia", "Noah", "Emma", "Oliver", "Ava", "Elijah", "Charlotte", "William", "Sophia",
    "James", "Amelia", "Benjamin", "Isabella", "Lucas", "Mia", "Henry", "Evelyn", "Alexander",
    "Harper",
];

const LAST_NAMES: [&str; 20] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

/// What `SeedService::generate` should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    pub groups: usize,
    pub students: usize,
    pub max_courses_per_student: usize,
    pub seed: u64,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            groups: 10,
            students: 200,
            max_courses_per_student: 3,
            seed: 0,
        }
    }
}

/// Rows created by one `generate` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub groups: usize,
    pub courses: usize,
    pub students: usize,
    pub enrollments: usize,
}

/// Seeds and resets the store through the entity repositories.
pub struct SeedService<G, C, S, E, R>
where
    G: GroupRepository,
    C: CourseRepository,
    S: StudentRepository,
    E: EnrollmentRepository,
    R: SchoolRepository + AtomicScope,
{
    groups: G,
    courses: C,
    students: S,
    enrollments: E,
    school: R,
}

impl<G, C, S, E, R> SeedService<G, C, S, E, R>
where
    G: GroupRepository,
    C: CourseRepository,
    S: StudentRepository,
    E: EnrollmentRepository,
    R: SchoolRepository + AtomicScope,
{
    pub fn new(groups: G, courses: C, students: S, enrollments: E, school: R) -> Self {
        Self {
            groups,
            courses,
            students,
            enrollments,
            school,
        }
    }

    /// Deletes every row of every table and restarts all id sequences.
    pub fn reset_all(&self) -> ServiceResult<()> {
        self.school.atomically("school_reset", || {
            self.school.reset_all()?;
            let counts = self.school.counts()?;
            confirm(counts.is_empty(), || {
                format!("store not empty after reset: {counts:?}")
            })
        })?;

        info!("event=school_reset module=service status=ok");
        Ok(())
    }

    pub fn counts(&self) -> ServiceResult<SchoolCounts> {
        Ok(self.school.counts()?)
    }

    /// Adds demo rows according to `plan`. Existing rows are kept; call
    /// `reset_all` first for a reproducible store.
    pub fn generate(&self, plan: &SeedPlan) -> ServiceResult<SeedReport> {
        info!(
            "event=seed_generate module=service status=start groups={} students={} seed={}",
            plan.groups, plan.students, plan.seed
        );
        let mut rng = StdRng::seed_from_u64(plan.seed);

        let report = self.school.atomically("seed_generate", || {
            let before = self.school.counts()?;

            let group_ids = self.generate_groups(&mut rng, plan.groups)?;
            let course_ids = self.generate_courses()?;
            let student_ids = self.generate_students(&mut rng, &group_ids, plan.students)?;
            let enrollments = self.assign_courses(
                &mut rng,
                &student_ids,
                &course_ids,
                plan.max_courses_per_student,
            )?;

            let report = SeedReport {
                groups: group_ids.len(),
                courses: course_ids.len(),
                students: student_ids.len(),
                enrollments,
            };
            let after = self.school.counts()?;
            confirm(grew_by(before, after, report), || {
                format!("seeded counts {after:?} do not match {report:?} on top of {before:?}")
            })?;
            Ok::<_, ServiceError>(report)
        })?;

        info!(
            "event=seed_generate module=service status=ok groups={} courses={} students={} enrollments={}",
            report.groups, report.courses, report.students, report.enrollments
        );
        Ok(report)
    }

    fn generate_groups(&self, rng: &mut StdRng, count: usize) -> ServiceResult<Vec<GroupId>> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.groups.save_without_id(&random_group_name(rng))?);
        }
        Ok(ids)
    }

    fn generate_courses(&self) -> ServiceResult<Vec<CourseId>> {
        let mut ids = Vec::with_capacity(COURSE_NAMES.len());
        for name in COURSE_NAMES {
            let description = format!("{name} Basics");
            ids.push(self.courses.save_without_id(name, &description)?);
        }
        Ok(ids)
    }

    fn generate_students(
        &self,
        rng: &mut StdRng,
        group_ids: &[GroupId],
        count: usize,
    ) -> ServiceResult<Vec<StudentId>> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let first_name = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
            let last_name = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
            let group_id = if group_ids.is_empty() {
                None
            } else {
                Some(group_ids[rng.random_range(0..group_ids.len())])
            };

            let id = self
                .students
                .save_without_id(group_id, first_name, last_name)?
                .ok_or_else(|| {
                    ServiceError::inconsistent(format!(
                        "student {first_name} {last_name} was not created"
                    ))
                })?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn assign_courses(
        &self,
        rng: &mut StdRng,
        student_ids: &[StudentId],
        course_ids: &[CourseId],
        max_per_student: usize,
    ) -> ServiceResult<usize> {
        let max_per_student = max_per_student.min(course_ids.len());
        if max_per_student == 0 {
            return Ok(0);
        }

        let mut added = 0;
        for &student_id in student_ids {
            let amount = rng.random_range(1..=max_per_student);
            for picked in index::sample(rng, course_ids.len(), amount) {
                let course_id = course_ids[picked];
                confirm(
                    self.enrollments.add_student_to_course(student_id, course_id)?,
                    || format!("student {student_id} was not added to course {course_id}"),
                )?;
                added += 1;
            }
        }
        Ok(added)
    }
}

/// Two uppercase letters, a dash, two digits, e.g. `XK-07`.
fn random_group_name(rng: &mut impl Rng) -> String {
    let mut name = String::with_capacity(5);
    for _ in 0..2 {
        name.push(char::from(b'A' + rng.random_range(0..26u8)));
    }
    name.push('-');
    for _ in 0..2 {
        name.push(char::from(b'0' + rng.random_range(0..10u8)));
    }
    name
}

fn grew_by(before: SchoolCounts, after: SchoolCounts, report: SeedReport) -> bool {
    let grew = |before: u64, after: u64, added: usize| after.checked_sub(before) == Some(added as u64);
    grew(before.groups, after.groups, report.groups)
        && grew(before.courses, after.courses, report.courses)
        && grew(before.students, after.students, report.students)
        && grew(before.enrollments, after.enrollments, report.enrollments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_group_name(name: &str) -> bool {
        let bytes = name.as_bytes();
        bytes.len() == 5
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2] == b'-'
            && bytes[3..].iter().all(u8::is_ascii_digit)
    }

    #[test]
    fn group_names_have_letters_dash_digits_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let name = random_group_name(&mut rng);
            assert!(is_group_name(&name), "unexpected group name `{name}`");
        }
    }

    #[test]
    fn group_names_are_reproducible_for_a_seed() {
        let mut left = StdRng::seed_from_u64(42);
        let mut right = StdRng::seed_from_u64(42);
        let a: Vec<String> = (0..10).map(|_| random_group_name(&mut left)).collect();
        let b: Vec<String> = (0..10).map(|_| random_group_name(&mut right)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn default_plan_matches_demo_sizes() {
        let plan = SeedPlan::default();
        assert_eq!(plan.groups, 10);
        assert_eq!(plan.students, 200);
        assert_eq!(plan.max_courses_per_student, 3);
    }

    #[test]
    fn grew_by_requires_exact_deltas() {
        let before = SchoolCounts {
            groups: 1,
            ..SchoolCounts::default()
        };
        let after = SchoolCounts {
            groups: 3,
            courses: 10,
            students: 4,
            enrollments: 5,
        };
        let report = SeedReport {
            groups: 2,
            courses: 10,
            students: 4,
            enrollments: 5,
        };
        assert!(grew_by(before, after, report));
        assert!(!grew_by(after, after, report));
    }
}
