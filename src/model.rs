use crate::availability::AvailabilityIndex;
use crate::conflicts::Analysis;
use crate::data::{Session, Teacher, TeacherName};
use crate::solver::SolveError;
use good_lp::variable;
use good_lp::{
    Expression, ProblemVariables, Solution, SolverModel, Variable, constraint, default_solver,
};
use itertools::Itertools;
use log::{info, trace, warn};
use std::time::{Duration, Instant};

/// Solves the global 0/1 staffing model with the HiGHS ILP solver.
///
/// Returns the chosen teacher for every group of `analysis`, in group order.
pub fn solve_model(
    sessions: &[Session],
    teachers: &[Teacher],
    index: &AvailabilityIndex,
    analysis: &Analysis,
    time_limit: Option<Duration>,
) -> Result<Vec<TeacherName>, SolveError> {
    let start_time = Instant::now();
    if sessions.is_empty() {
        return Ok(Vec::new());
    }

    let mut group_of = vec![0usize; sessions.len()];
    for (g, analysed) in analysis.groups.iter().enumerate() {
        for &i in &analysed.group.members {
            group_of[i] = g;
        }
    }

    // Tie-break bonuses, all below one preferred match in total: the group's
    // representative preference first, then the lexically lowest name.
    let ranking: Vec<&str> = teachers
        .iter()
        .map(|t| t.name.as_str())
        .sorted()
        .dedup()
        .collect();
    let representative_bonus = 1.0 / (2.0 * (sessions.len() + 1) as f64);
    let tie_bonus = |name: &str, representative: &str| -> f64 {
        let rank = ranking.binary_search(&name).unwrap_or(ranking.len());
        let lexical =
            representative_bonus * (ranking.len() - rank) as f64 / (ranking.len() + 1) as f64;
        if name == representative {
            representative_bonus + lexical
        } else {
            lexical
        }
    };

    info!(
        "Setting up ILP model with {} sessions, {} teachers and {} course groups...",
        sessions.len(),
        teachers.len(),
        analysis.groups.len()
    );
    let mut problem = ProblemVariables::new();
    let mut objective_terms: Vec<Expression> = Vec::new();

    // x_ij =  1 if session i is taught by teacher j
    //         0 otherwise
    // pre-filter: pairs outside availability or the group's candidates get no
    // variable, which fixes them at 0
    let mut x: Vec<Vec<Option<Variable>>> = Vec::with_capacity(sessions.len());
    let mut variable_count = 0usize;
    for (i, session) in sessions.iter().enumerate() {
        let analysed = &analysis.groups[group_of[i]];
        let mut row = Vec::with_capacity(teachers.len());
        for teacher in teachers {
            if index.is_available(i, &teacher.name) && analysed.candidates.contains(&teacher.name)
            {
                let var = problem.add(variable().binary());
                let mut weight = tie_bonus(&teacher.name, &analysed.preferred);
                if teacher.name == session.preferred_teacher {
                    weight += 1.0;
                }
                objective_terms.push(weight * var);
                variable_count += 1;
                row.push(Some(var));
            } else {
                row.push(None);
            }
        }
        x.push(row);
    }
    trace!(
        "Generated {} assignment variables out of a theoretical maximum of {}.",
        variable_count,
        sessions.len() * teachers.len()
    );

    let objective: Expression = objective_terms.into_iter().sum();
    let mut model = problem
        .maximise(objective)
        .using(default_solver)
        .set_option("threads", 1) // limit to 1 thread for reproducibility
        .set_option("random_seed", 1234)
        .set_option("mip_rel_gap", 0.0) // tie-break bonuses must be resolved exactly
        .set_option("log_to_console", "false");
    if let Some(limit) = time_limit {
        model = model.set_option("time_limit", limit.as_secs_f64());
    }

    info!("Adding 'exactly one teacher per session' constraints...");
    for row in &x {
        let assigned: Expression = row.iter().flatten().copied().sum();
        model.add_constraint(constraint!(assigned == 1));
    }

    info!("Adding 'same teacher across a course group' constraints...");
    for analysed in &analysis.groups {
        for (a, b) in analysed.group.members.iter().tuple_windows() {
            for j in 0..teachers.len() {
                match (x[*a][j], x[*b][j]) {
                    (Some(first), Some(second)) => {
                        model.add_constraint(constraint!(first == second));
                    }
                    (Some(only), None) | (None, Some(only)) => {
                        model.add_constraint(constraint!(only == 0));
                    }
                    (None, None) => {}
                }
            }
        }
    }

    info!("Starting ILP solver...");
    let outcome = model.solve();
    let elapsed = start_time.elapsed();
    let timed_out = time_limit.is_some_and(|limit| elapsed >= limit);
    let solution = match outcome {
        Ok(solution) => solution,
        Err(_) if timed_out => return Err(SolveError::TimeLimitExceeded),
        Err(e) => {
            return Err(SolveError::NoSolution(format!(
                "No feasible solution found. Solver error: {}",
                e
            )));
        }
    };
    info!("Solution found in {:.2?}", elapsed);

    let chosen = read_back(
        sessions,
        teachers,
        index,
        analysis,
        &x,
        timed_out,
        |v| solution.value(v),
    )?;

    if timed_out {
        warn!("ILP search hit its time limit; keeping the incumbent solution");
    }
    Ok(chosen)
}

/// Reads the chosen teacher of every group out of solved variable values and
/// re-checks the hard constraints: one teacher per session, availability, and
/// the same teacher across each group.
fn read_back(
    sessions: &[Session],
    teachers: &[Teacher],
    index: &AvailabilityIndex,
    analysis: &Analysis,
    x: &[Vec<Option<Variable>>],
    timed_out: bool,
    value: impl Fn(Variable) -> f64,
) -> Result<Vec<TeacherName>, SolveError> {
    let mut chosen = Vec::with_capacity(analysis.groups.len());
    for analysed in &analysis.groups {
        let mut group_teacher: Option<&TeacherName> = None;
        for &i in &analysed.group.members {
            let picked: Vec<usize> = x[i]
                .iter()
                .positions(|var| var.is_some_and(|v| value(v) > 0.9))
                .collect();
            let teacher = match picked.as_slice() {
                [j] => &teachers[*j].name,
                _ if timed_out => return Err(SolveError::TimeLimitExceeded),
                _ => {
                    return Err(SolveError::InvalidSolution(format!(
                        "session {} ({}) received {} teachers",
                        i,
                        sessions[i].id,
                        picked.len()
                    )));
                }
            };
            if !index.is_available(i, teacher) {
                return Err(SolveError::InvalidSolution(format!(
                    "teacher {} is not available at {}",
                    teacher, sessions[i].time_slot
                )));
            }
            match group_teacher {
                None => group_teacher = Some(teacher),
                Some(existing) if existing != teacher => {
                    return Err(SolveError::InvalidSolution(format!(
                        "course {} split between {} and {}",
                        analysed.group.id, existing, teacher
                    )));
                }
                Some(_) => {}
            }
        }
        match group_teacher {
            Some(teacher) => chosen.push(teacher.clone()),
            None => {
                return Err(SolveError::InvalidSolution(format!(
                    "course {} has no sessions",
                    analysed.group.id
                )));
            }
        }
    }
    Ok(chosen)
}
