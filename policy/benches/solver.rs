use criterion::{black_box, criterion_group, criterion_main, Criterion};
use policy::{Solver, Trainer};
use tictactoe::{Board, Role, Rules};

fn trained_solver() -> Solver {
    let mut trainer = Trainer::new(Rules::default()).seeded(0);
    trainer.run(2000).unwrap();
    let attacker = trainer.attacker.table().clone();
    let defender = trainer.defender.table().clone();
    Solver::new(attacker, defender)
}

fn solve(c: &mut Criterion) {
    let solver = trained_solver();
    c.bench_function("solve empty 3x3", |b| {
        let board = Board::default();
        b.iter(|| solver.solve(black_box(&board), Role::Attacker))
    });
    c.bench_function("solve middle game 3x3", |b| {
        let board: Board = "-1,0,1,0,-1,0,0,0,0".parse().unwrap();
        b.iter(|| solver.solve(black_box(&board), Role::Defender))
    });
}

fn self_play(c: &mut Criterion) {
    c.bench_function("self-play game 3x3", |b| {
        let mut trainer = Trainer::new(Rules::default()).seeded(1);
        b.iter(|| trainer.play().unwrap())
    });
    c.bench_function("self-play game 5x5 win by 4", |b| {
        let mut trainer = Trainer::new(Rules::new(5, 5, 4).unwrap()).seeded(1);
        b.iter(|| trainer.play().unwrap())
    });
}

criterion_group!(benches, solve, self_play);
criterion_main!(benches);
