use libtest_mimic::Arguments;

fn main() {
    let args = Arguments::from_args();

    let trials = integration_tests::scenarios()
        .into_iter()
        .map(integration_tests::Scenario::trial)
        .collect();

    libtest_mimic::run(&args, trials).exit()
}
